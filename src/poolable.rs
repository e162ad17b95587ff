//! The capability every pooled instance supports

use serde::{Deserialize, Serialize};

use crate::template::TemplateId;

/// Coordinate space a [`Placement`] is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Space {
    #[default]
    World,
    /// Relative to the instance's parent (its auto-group, when it has one).
    Local,
}

/// Position and orientation applied to an instance when it is handed out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub position: [f32; 3],
    /// Unit quaternion as `[x, y, z, w]`.
    pub rotation: [f32; 4],
    pub space: Space,
}

impl Placement {
    pub const IDENTITY_ROTATION: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

    pub fn new(position: [f32; 3], rotation: [f32; 4]) -> Self {
        Self {
            position,
            rotation,
            space: Space::World,
        }
    }

    /// Placement at `position` with no rotation.
    pub fn at(position: [f32; 3]) -> Self {
        Self::new(position, Self::IDENTITY_ROTATION)
    }

    pub fn in_local_space(mut self) -> Self {
        self.space = Space::Local;
        self
    }

    pub fn is_local(&self) -> bool {
        self.space == Space::Local
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::at([0.0; 3])
    }
}

/// Behaviour required from anything living in a pool.
///
/// The pool owns activation state. Instances only observe transitions
/// through these hooks, and never release themselves: whoever deactivates
/// an instance goes through [`PoolRegistry::deactivate`], which fires
/// [`on_release`](Poolable::on_release) and then unregisters the handle.
///
/// [`PoolRegistry::deactivate`]: crate::PoolRegistry::deactivate
pub trait Poolable {
    /// Binds the instance to its template. Called once, at creation time;
    /// the instance starts deactivated.
    fn on_pool_init(&mut self, template: &TemplateId);

    /// Called each time the instance is handed out, including forced
    /// reacquires from a recycling pool.
    fn on_activate(&mut self, placement: &Placement) {
        let _ = placement;
    }

    /// Called when the instance is deactivated by its owning context.
    fn on_release(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_defaults_to_world_space() {
        let placement = Placement::at([1.0, 2.0, 3.0]);
        assert!(!placement.is_local());
        assert_eq!(placement.rotation, Placement::IDENTITY_ROTATION);
        assert!(placement.in_local_space().is_local());
    }
}

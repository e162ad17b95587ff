//! Pool entry configuration

use serde::{Deserialize, Serialize};

use crate::template::TemplateId;

/// What a pool does when an acquire finds no inactive instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Create one more instance and hand it out.
    #[default]
    Grow,

    /// Hand out the oldest active instance again without releasing it.
    ///
    /// The previous holder is not notified. Holders of instances from a
    /// recycling pool must not keep references across ticks.
    RecycleOldestActive,
}

/// Configuration for one pool
///
/// # Examples
///
/// ```
/// use prefab_pool::{OverflowPolicy, PoolEntry};
///
/// let entry = PoolEntry::new("Bullet", 32)
///     .with_overflow(OverflowPolicy::RecycleOldestActive)
///     .with_auto_group(true);
///
/// assert_eq!(entry.capacity, 32);
/// assert!(entry.auto_group);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolEntry {
    /// Template the pool's instances are copied from
    pub template: TemplateId,

    /// Number of instances created when the pool is populated
    #[serde(default)]
    pub capacity: usize,

    /// Behavior once every instance is active
    #[serde(default)]
    pub overflow: OverflowPolicy,

    /// Whether instances share a common parent named after the template
    #[serde(default)]
    pub auto_group: bool,
}

impl PoolEntry {
    /// Create an entry with the default `Grow` policy and no grouping
    pub fn new(template: impl Into<TemplateId>, capacity: usize) -> Self {
        Self {
            template: template.into(),
            capacity,
            overflow: OverflowPolicy::default(),
            auto_group: false,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    /// Shorthand for `with_overflow(OverflowPolicy::RecycleOldestActive)`
    pub fn recycling(self) -> Self {
        self.with_overflow(OverflowPolicy::RecycleOldestActive)
    }

    pub fn with_auto_group(mut self, auto_group: bool) -> Self {
        self.auto_group = auto_group;
        self
    }
}

/// File shape read by the JSON config source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolManifest {
    #[serde(default)]
    pub pools: Vec<PoolEntry>,
}

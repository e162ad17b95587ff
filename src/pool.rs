//! Per-template instance pool

use std::collections::VecDeque;

use tracing::{debug, error, warn};

use crate::config::{OverflowPolicy, PoolEntry};
use crate::errors::PoolError;
use crate::health::HealthStatus;
use crate::metrics::{MetricsTracker, PoolMetrics};
use crate::poolable::Poolable;
use crate::template::{TemplateId, TemplateLibrary};

/// Reference to one pooled instance.
///
/// Handles stay valid until the registry that issued them is initialized
/// again; after that every operation taking the handle is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceHandle {
    template: TemplateId,
    slot: usize,
    generation: u64,
}

impl InstanceHandle {
    /// Template the instance was copied from.
    pub fn template(&self) -> &TemplateId {
        &self.template
    }

    /// Creation index of the instance within its pool.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Registry generation the handle was issued in.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

struct Slot<T> {
    instance: T,
    active: bool,
}

/// All instances of one template.
///
/// Instances are kept in creation order. A slot is either inactive or
/// listed exactly once in `active`, which is ordered by acquisition.
pub struct ObjectPool<T> {
    entry: PoolEntry,
    generation: u64,
    slots: Vec<Slot<T>>,
    active: VecDeque<usize>,
    metrics: MetricsTracker,
}

impl<T: Poolable> ObjectPool<T> {
    pub(crate) fn new(entry: PoolEntry, generation: u64) -> Self {
        Self {
            slots: Vec::with_capacity(entry.capacity),
            active: VecDeque::with_capacity(entry.capacity),
            entry,
            generation,
            metrics: MetricsTracker::new(),
        }
    }

    /// Create `capacity` inactive instances.
    ///
    /// Copies that fail the capability check are destroyed and skipped.
    /// Returns the number of instances actually created.
    pub(crate) fn populate<L>(&mut self, library: &mut L) -> usize
    where
        L: TemplateLibrary<Instance = T>,
    {
        let mut created = 0;
        for _ in 0..self.entry.capacity {
            if self.spawn(library).is_some() {
                created += 1;
            }
        }
        created
    }

    fn spawn<L>(&mut self, library: &mut L) -> Option<usize>
    where
        L: TemplateLibrary<Instance = T>,
    {
        let object = library.instantiate(&self.entry.template);
        match library.attach(object) {
            Ok(mut instance) => {
                instance.on_pool_init(&self.entry.template);
                self.slots.push(Slot {
                    instance,
                    active: false,
                });
                Some(self.slots.len() - 1)
            }
            Err(stray) => {
                library.destroy(stray);
                self.metrics.capability_failures += 1;
                error!(
                    "{}",
                    PoolError::MissingCapability(self.entry.template.clone())
                );
                None
            }
        }
    }

    /// Take an instance out of the pool, resolving exhaustion through the
    /// overflow policy. The returned instance is already in the active list.
    pub(crate) fn acquire<L>(&mut self, library: &mut L) -> Option<InstanceHandle>
    where
        L: TemplateLibrary<Instance = T>,
    {
        self.acquire_inner(library, true)
    }

    fn acquire_inner<L>(&mut self, library: &mut L, may_grow: bool) -> Option<InstanceHandle>
    where
        L: TemplateLibrary<Instance = T>,
    {
        if let Some(slot) = self.slots.iter().position(|s| !s.active) {
            self.slots[slot].active = true;
            self.active.push_back(slot);
            self.metrics.total_acquired += 1;
            return Some(self.handle(slot));
        }

        match self.entry.overflow {
            OverflowPolicy::Grow if may_grow => {
                warn!(
                    template = %self.entry.template,
                    capacity = self.entry.capacity,
                    instances = self.slots.len(),
                    "Pool too small, creating one more instance. Increase the pool capacity."
                );
                self.spawn(library)?;
                self.metrics.grow_events += 1;
                self.acquire_inner(library, false)
            }
            OverflowPolicy::Grow => None,
            OverflowPolicy::RecycleOldestActive => {
                let slot = self.active.pop_front()?;
                self.active.push_back(slot);
                self.metrics.recycle_events += 1;
                self.metrics.total_acquired += 1;
                debug!(template = %self.entry.template, slot, "Reusing oldest active instance");
                Some(self.handle(slot))
            }
        }
    }

    /// Move `handle` back to the inactive set.
    ///
    /// Returns `false` without touching anything when the handle is not
    /// active in this pool: foreign, stale, or already released.
    pub(crate) fn release(&mut self, handle: &InstanceHandle) -> bool {
        if !self.is_active(handle) {
            return false;
        }

        if let Some(index) = self.active.iter().position(|&s| s == handle.slot) {
            self.active.remove(index);
        }
        self.slots[handle.slot].active = false;
        self.metrics.total_released += 1;
        true
    }

    /// Whether `handle` was issued by this pool in its current generation.
    pub fn owns(&self, handle: &InstanceHandle) -> bool {
        handle.generation == self.generation
            && handle.template == self.entry.template
            && handle.slot < self.slots.len()
    }

    /// Whether `handle` is owned by this pool and currently handed out.
    pub fn is_active(&self, handle: &InstanceHandle) -> bool {
        self.owns(handle) && self.slots[handle.slot].active
    }

    /// Instance behind `handle`, active or not. `None` for foreign or stale handles.
    pub fn get(&self, handle: &InstanceHandle) -> Option<&T> {
        self.owns(handle).then(|| &self.slots[handle.slot].instance)
    }

    /// Mutable access to the instance behind `handle`.
    pub fn get_mut(&mut self, handle: &InstanceHandle) -> Option<&mut T> {
        if self.owns(handle) {
            Some(&mut self.slots[handle.slot].instance)
        } else {
            None
        }
    }

    /// Iterate all instances in creation order.
    pub fn instances(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().map(|s| &s.instance)
    }

    /// Handles of the active instances, oldest acquisition first.
    pub fn active_handles(&self) -> Vec<InstanceHandle> {
        self.active.iter().map(|&slot| self.handle(slot)).collect()
    }

    /// Template this pool copies instances from.
    pub fn template(&self) -> &TemplateId {
        &self.entry.template
    }

    /// Entry the pool was built from.
    pub fn entry(&self) -> &PoolEntry {
        &self.entry
    }

    /// Name of the shared parent for auto-grouped pools.
    pub fn group(&self) -> Option<&str> {
        self.entry.auto_group.then(|| self.entry.template.as_str())
    }

    /// Number of instances currently handed out.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of instances waiting to be acquired.
    pub fn inactive_count(&self) -> usize {
        self.slots.len() - self.active.len()
    }

    /// Number of live instances, grown ones included.
    pub fn total_count(&self) -> usize {
        self.slots.len()
    }

    /// Get pool metrics
    pub fn get_metrics(&self) -> PoolMetrics {
        self.metrics.get_metrics(
            self.active_count(),
            self.inactive_count(),
            self.entry.capacity,
        )
    }

    /// Get health status
    pub fn get_health_status(&self) -> HealthStatus {
        HealthStatus::new(
            self.active_count(),
            self.inactive_count(),
            self.entry.capacity,
            self.slots.len().saturating_sub(self.entry.capacity),
        )
    }

    fn handle(&self, slot: usize) -> InstanceHandle {
        InstanceHandle {
            template: self.entry.template.clone(),
            slot,
            generation: self.generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::TemplateCatalog;

    #[derive(Default)]
    struct Shard {
        template: Option<TemplateId>,
    }

    impl Poolable for Shard {
        fn on_pool_init(&mut self, template: &TemplateId) {
            self.template = Some(template.clone());
        }
    }

    fn catalog() -> TemplateCatalog<Shard> {
        let mut catalog = TemplateCatalog::new();
        catalog.register("Shard", Shard::default).register_inert("Dust");
        catalog
    }

    fn populated(entry: PoolEntry, catalog: &mut TemplateCatalog<Shard>) -> ObjectPool<Shard> {
        let mut pool = ObjectPool::new(entry, 0);
        pool.populate(catalog);
        pool
    }

    #[test]
    fn test_populate_binds_template() {
        let mut catalog = catalog();
        let pool = populated(PoolEntry::new("Shard", 3), &mut catalog);

        assert_eq!(pool.total_count(), 3);
        assert_eq!(pool.inactive_count(), 3);
        assert_eq!(pool.active_count(), 0);
        assert!(pool
            .instances()
            .all(|s| s.template.as_ref().map(TemplateId::as_str) == Some("Shard")));
    }

    #[test]
    fn test_populate_destroys_copies_without_capability() {
        let mut catalog = catalog();
        let pool = populated(PoolEntry::new("Dust", 2), &mut catalog);

        assert_eq!(pool.total_count(), 0);
        assert_eq!(catalog.destroyed_count(), 2);
        assert_eq!(pool.get_metrics().capability_failures, 2);
    }

    #[test]
    fn test_acquire_scans_in_creation_order() {
        let mut catalog = catalog();
        let mut pool = populated(PoolEntry::new("Shard", 3), &mut catalog);

        let a = pool.acquire(&mut catalog).unwrap();
        let b = pool.acquire(&mut catalog).unwrap();
        assert_eq!((a.slot(), b.slot()), (0, 1));

        assert!(pool.release(&a));
        let c = pool.acquire(&mut catalog).unwrap();
        assert_eq!(c.slot(), 0);
        assert_eq!(pool.active_handles(), vec![b, c]);
    }

    #[test]
    fn test_grow_adds_exactly_one_instance() {
        let mut catalog = catalog();
        let mut pool = populated(PoolEntry::new("Shard", 2), &mut catalog);

        pool.acquire(&mut catalog).unwrap();
        pool.acquire(&mut catalog).unwrap();
        let grown = pool.acquire(&mut catalog).unwrap();

        assert_eq!(grown.slot(), 2);
        assert_eq!(pool.total_count(), 3);
        assert_eq!(pool.active_count(), 3);
        assert_eq!(pool.get_metrics().grow_events, 1);
        assert!(!pool.get_health_status().is_healthy());
    }

    #[test]
    fn test_failed_grow_is_not_counted() {
        let mut catalog = catalog();
        let mut pool = populated(PoolEntry::new("Dust", 0), &mut catalog);

        assert!(pool.acquire(&mut catalog).is_none());

        let metrics = pool.get_metrics();
        assert_eq!(metrics.grow_events, 0);
        assert_eq!(metrics.capability_failures, 1);
        assert_eq!(pool.get_health_status().grown_by, 0);
    }

    #[test]
    fn test_grow_from_zero_capacity() {
        let mut catalog = catalog();
        let mut pool = populated(PoolEntry::new("Shard", 0), &mut catalog);

        let handle = pool.acquire(&mut catalog).unwrap();
        assert_eq!(handle.slot(), 0);
        assert_eq!(pool.total_count(), 1);
    }

    #[test]
    fn test_recycle_hands_out_oldest_active() {
        let mut catalog = catalog();
        let mut pool = populated(PoolEntry::new("Shard", 2).recycling(), &mut catalog);

        let a = pool.acquire(&mut catalog).unwrap();
        let b = pool.acquire(&mut catalog).unwrap();
        let again = pool.acquire(&mut catalog).unwrap();

        assert_eq!(again, a);
        assert_eq!(pool.total_count(), 2);
        assert_eq!(pool.active_count(), 2);
        assert_eq!(pool.active_handles(), vec![b.clone(), a]);

        // The next forced reacquire moves on to the next-oldest holder
        assert_eq!(pool.acquire(&mut catalog).unwrap(), b);
        assert_eq!(pool.get_metrics().recycle_events, 2);
    }

    #[test]
    fn test_recycle_with_no_instances_returns_none() {
        let mut catalog = catalog();
        let mut pool = populated(PoolEntry::new("Shard", 0).recycling(), &mut catalog);

        assert!(pool.acquire(&mut catalog).is_none());
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut catalog = catalog();
        let mut pool = populated(PoolEntry::new("Shard", 2), &mut catalog);

        let handle = pool.acquire(&mut catalog).unwrap();
        assert!(pool.release(&handle));
        assert!(!pool.release(&handle));
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.inactive_count(), 2);
        assert_eq!(pool.get_metrics().total_released, 1);
    }

    #[test]
    fn test_foreign_generation_is_not_owned() {
        let mut catalog = catalog();
        let mut old = populated(PoolEntry::new("Shard", 1), &mut catalog);
        let handle = old.acquire(&mut catalog).unwrap();

        let mut fresh = ObjectPool::new(PoolEntry::new("Shard", 1), 1);
        fresh.populate(&mut catalog);

        assert!(!fresh.owns(&handle));
        assert!(!fresh.release(&handle));
        assert!(fresh.get(&handle).is_none());
    }

    #[test]
    fn test_group_only_for_auto_grouped_entries() {
        let mut catalog = catalog();
        let grouped = populated(PoolEntry::new("Shard", 1).with_auto_group(true), &mut catalog);
        let loose = populated(PoolEntry::new("Shard", 1), &mut catalog);

        assert_eq!(grouped.group(), Some("Shard"));
        assert_eq!(loose.group(), None);
    }
}

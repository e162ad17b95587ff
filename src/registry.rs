//! Template-keyed registry of pools

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::PoolEntry;
use crate::errors::PoolError;
use crate::health::HealthStatus;
use crate::metrics::PoolMetrics;
use crate::pool::{InstanceHandle, ObjectPool};
use crate::poolable::{Placement, Poolable};
use crate::template::{TemplateId, TemplateLibrary};

/// Outcome of [`PoolRegistry::initialize`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    /// Pools built from valid entries
    pub pools_created: usize,

    /// Instances created across all pools
    pub instances_created: usize,

    /// Entries that were skipped, with the reason
    pub skipped: Vec<PoolError>,
}

/// Owns every pool of a running session and routes calls by template.
///
/// The registry is the single writer of pool membership. Construct one per
/// session and pass it to whatever spawns pooled objects; wrap it in a
/// [`SharedPoolRegistry`] when pool operations may come from several threads.
///
/// # Examples
///
/// ```
/// use prefab_pool::{Placement, PoolEntry, PoolRegistry, Poolable, TemplateCatalog, TemplateId};
///
/// #[derive(Default)]
/// struct Rock { position: [f32; 3] }
///
/// impl Poolable for Rock {
///     fn on_pool_init(&mut self, _template: &TemplateId) {}
///     fn on_activate(&mut self, placement: &Placement) {
///         self.position = placement.position;
///     }
/// }
///
/// let mut catalog = TemplateCatalog::new();
/// catalog.register("Rock", Rock::default);
///
/// let mut registry = PoolRegistry::new(catalog);
/// registry.initialize(vec![PoolEntry::new("Rock", 3)]);
///
/// let rock = registry.acquire(&"Rock".into(), Placement::at([1.0, 0.0, 5.0])).unwrap();
/// assert_eq!(registry.get(&rock).unwrap().position, [1.0, 0.0, 5.0]);
///
/// registry.deactivate(&rock);
/// assert!(!registry.is_active(&rock));
/// ```
pub struct PoolRegistry<L: TemplateLibrary> {
    library: L,
    pools: HashMap<TemplateId, ObjectPool<L::Instance>>,
    generation: u64,
    unknown_template_misses: usize,
}

impl<L: TemplateLibrary> PoolRegistry<L> {
    /// Create an empty registry. Nothing can be acquired until
    /// [`initialize`](Self::initialize) has run.
    pub fn new(library: L) -> Self {
        Self {
            library,
            pools: HashMap::new(),
            generation: 0,
            unknown_template_misses: 0,
        }
    }

    /// Discard every existing pool and build one pool per valid entry.
    ///
    /// Entries whose template does not resolve, and repeats of a template
    /// already seen in this call, are skipped with a warning. Handles issued
    /// before this call stop resolving.
    pub fn initialize<I>(&mut self, entries: I) -> InitReport
    where
        I: IntoIterator<Item = PoolEntry>,
    {
        let discarded = self.pools.len();
        self.pools.clear();
        self.generation += 1;
        debug!(
            generation = self.generation,
            discarded, "Resetting pool registry"
        );

        let mut report = InitReport::default();

        for entry in entries {
            if !self.library.resolve(&entry.template) {
                let err = PoolError::InvalidTemplate(entry.template);
                warn!("{}, skipping pool entry", err);
                report.skipped.push(err);
                continue;
            }

            if self.pools.contains_key(&entry.template) {
                let err = PoolError::DuplicateTemplate(entry.template);
                warn!("{}, keeping the first entry", err);
                report.skipped.push(err);
                continue;
            }

            let template = entry.template.clone();
            let mut pool = ObjectPool::new(entry, self.generation);
            let created = pool.populate(&mut self.library);
            debug!(%template, created, "Created pool");

            report.pools_created += 1;
            report.instances_created += created;
            self.pools.insert(template, pool);
        }

        report
    }

    /// Hand out an instance of `template`, placed and activated.
    ///
    /// Returns `None` only when `template` was never registered, or when the
    /// pool could not produce an instance at all (no instances and nothing
    /// to recycle, or growth failed the capability check).
    pub fn acquire(
        &mut self,
        template: &TemplateId,
        placement: Placement,
    ) -> Option<InstanceHandle> {
        let Some(pool) = self.pools.get_mut(template) else {
            self.unknown_template_misses += 1;
            warn!("{}", PoolError::UnknownTemplate(template.clone()));
            return None;
        };

        let handle = pool.acquire(&mut self.library)?;
        if let Some(instance) = pool.get_mut(&handle) {
            instance.on_activate(&placement);
        }
        Some(handle)
    }

    /// [`acquire`](Self::acquire) with the placement given as parts.
    pub fn acquire_at(
        &mut self,
        template: &TemplateId,
        position: [f32; 3],
        rotation: [f32; 4],
        use_local_space: bool,
    ) -> Option<InstanceHandle> {
        let placement = Placement::new(position, rotation);
        let placement = if use_local_space {
            placement.in_local_space()
        } else {
            placement
        };
        self.acquire(template, placement)
    }

    /// Return `handle` to its pool's inactive set.
    ///
    /// Unknown, stale, and already released handles are ignored.
    pub fn release(&mut self, handle: &InstanceHandle) {
        match self.pools.get_mut(handle.template()) {
            Some(pool) => {
                if pool.release(handle) {
                    debug!(
                        template = %handle.template(),
                        slot = handle.slot(),
                        "Released instance"
                    );
                }
            }
            None => debug!(template = %handle.template(), "Ignoring release for unknown pool"),
        }
    }

    /// Deactivate the instance behind `handle`: fire its release hook, then
    /// return it to the pool. No-op unless the instance is currently active.
    ///
    /// For recycled instances this also displaces whoever received the
    /// instance most recently.
    pub fn deactivate(&mut self, handle: &InstanceHandle) {
        let Some(pool) = self.pools.get_mut(handle.template()) else {
            return;
        };
        if !pool.is_active(handle) {
            return;
        }
        if let Some(instance) = pool.get_mut(handle) {
            instance.on_release();
        }
        pool.release(handle);
    }

    /// Instance behind `handle`, or `None` for stale and unknown handles.
    pub fn get(&self, handle: &InstanceHandle) -> Option<&L::Instance> {
        self.pools.get(handle.template())?.get(handle)
    }

    /// Mutable access to the instance behind `handle`.
    pub fn get_mut(&mut self, handle: &InstanceHandle) -> Option<&mut L::Instance> {
        self.pools.get_mut(handle.template())?.get_mut(handle)
    }

    /// Whether `handle` is currently handed out in this generation.
    pub fn is_active(&self, handle: &InstanceHandle) -> bool {
        self.pools
            .get(handle.template())
            .is_some_and(|pool| pool.is_active(handle))
    }

    /// Pool built for `template`, if any.
    pub fn pool(&self, template: &TemplateId) -> Option<&ObjectPool<L::Instance>> {
        self.pools.get(template)
    }

    /// Iterate every pool, in no particular order.
    pub fn pools(&self) -> impl Iterator<Item = &ObjectPool<L::Instance>> {
        self.pools.values()
    }

    /// Number of pools built by the last `initialize`.
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Number of completed [`initialize`](Self::initialize) calls.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Acquire calls that named a template with no pool.
    pub fn unknown_template_misses(&self) -> usize {
        self.unknown_template_misses
    }

    /// Get metrics for the pool of `template`
    pub fn metrics(&self, template: &TemplateId) -> Option<PoolMetrics> {
        self.pools.get(template).map(ObjectPool::get_metrics)
    }

    /// Get health status for the pool of `template`
    pub fn health(&self, template: &TemplateId) -> Option<HealthStatus> {
        self.pools.get(template).map(ObjectPool::get_health_status)
    }

    /// Template library the registry instantiates from.
    pub fn library(&self) -> &L {
        &self.library
    }

    /// Mutable access to the template library.
    pub fn library_mut(&mut self) -> &mut L {
        &mut self.library
    }
}

/// A [`PoolRegistry`] behind a lock, for hosts that dispatch ticks from
/// more than one thread.
///
/// Every operation takes the lock for its whole duration, so pool membership
/// still has a single writer at a time.
pub struct SharedPoolRegistry<L: TemplateLibrary> {
    inner: Arc<Mutex<PoolRegistry<L>>>,
}

impl<L: TemplateLibrary> Clone for SharedPoolRegistry<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: TemplateLibrary> SharedPoolRegistry<L> {
    /// Take ownership of `registry` and put it behind a lock.
    pub fn new(registry: PoolRegistry<L>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    /// See [`PoolRegistry::initialize`].
    pub fn initialize<I>(&self, entries: I) -> InitReport
    where
        I: IntoIterator<Item = PoolEntry>,
    {
        self.inner.lock().initialize(entries)
    }

    /// See [`PoolRegistry::acquire`].
    pub fn acquire(&self, template: &TemplateId, placement: Placement) -> Option<InstanceHandle> {
        self.inner.lock().acquire(template, placement)
    }

    /// See [`PoolRegistry::release`].
    pub fn release(&self, handle: &InstanceHandle) {
        self.inner.lock().release(handle)
    }

    /// See [`PoolRegistry::deactivate`].
    pub fn deactivate(&self, handle: &InstanceHandle) {
        self.inner.lock().deactivate(handle)
    }

    /// Run `f` with exclusive access to the registry.
    pub fn with<R>(&self, f: impl FnOnce(&mut PoolRegistry<L>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

//! # prefab_pool
//!
//! Template-keyed object pools for tick-driven games.
//!
//! ## Features
//!
//! - One pool per template, pre-populated at startup
//! - Overflow policies: grow by one instance, or recycle the oldest active one
//! - Capability-checked construction: copies that cannot be pooled are destroyed
//! - Generation-tagged handles: stale handles are ignored after a reset
//! - Release hooks driven by explicit deactivation
//! - JSON pool manifests and async entry sources
//! - Health monitoring and metrics, with Prometheus text export
//! - Lock-guarded registry for multi-threaded hosts
//!
//! ## Quick Start
//!
//! ```rust
//! use prefab_pool::{Placement, PoolEntry, PoolRegistry, Poolable, TemplateCatalog, TemplateId};
//!
//! struct Bullet;
//! impl Poolable for Bullet {
//!     fn on_pool_init(&mut self, _template: &TemplateId) {}
//! }
//!
//! let mut catalog = TemplateCatalog::new();
//! catalog.register("Bullet", || Bullet);
//!
//! let mut registry = PoolRegistry::new(catalog);
//! registry.initialize(vec![PoolEntry::new("Bullet", 2).recycling()]);
//!
//! let bullet: TemplateId = "Bullet".into();
//! let a = registry.acquire(&bullet, Placement::default()).unwrap();
//! let _b = registry.acquire(&bullet, Placement::default()).unwrap();
//!
//! // Pool exhausted: the oldest active bullet is handed out again
//! let c = registry.acquire(&bullet, Placement::default()).unwrap();
//! assert_eq!(a, c);
//! ```
//!
//! ## Threading
//!
//! [`PoolRegistry`] assumes a single logical thread driving every acquire,
//! release and growth. Hosts dispatching ticks from several threads should
//! go through [`SharedPoolRegistry`].

mod config;
mod errors;
mod health;
mod loader;
mod metrics;
mod pool;
mod poolable;
mod registry;
mod template;

pub use config::{OverflowPolicy, PoolEntry, PoolManifest};
pub use errors::{PoolError, PoolResult};
pub use health::HealthStatus;
pub use loader::{EntrySource, JsonFileSource, PoolDataSender, StaticEntries};
#[cfg(feature = "metrics")]
pub use metrics::MetricsExporter;
pub use metrics::PoolMetrics;
pub use pool::{InstanceHandle, ObjectPool};
pub use poolable::{Placement, Poolable, Space};
pub use registry::{InitReport, PoolRegistry, SharedPoolRegistry};
pub use template::{CatalogObject, TemplateCatalog, TemplateId, TemplateLibrary};

//! Metrics collection and export for pools

use std::collections::HashMap;

/// Snapshot of one pool's counters
///
/// # Examples
///
/// ```
/// use prefab_pool::{Placement, PoolEntry, PoolRegistry, Poolable, TemplateCatalog, TemplateId};
///
/// struct Rock;
/// impl Poolable for Rock {
///     fn on_pool_init(&mut self, _template: &TemplateId) {}
/// }
///
/// let mut catalog = TemplateCatalog::new();
/// catalog.register("Rock", || Rock);
///
/// let mut registry = PoolRegistry::new(catalog);
/// registry.initialize(vec![PoolEntry::new("Rock", 3)]);
///
/// let _rock = registry.acquire(&"Rock".into(), Placement::default()).unwrap();
/// let metrics = registry.metrics(&"Rock".into()).unwrap();
/// assert_eq!(metrics.total_acquired, 1);
/// assert_eq!(metrics.active_objects, 1);
/// assert_eq!(metrics.inactive_objects, 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PoolMetrics {
    /// Total instances handed out, forced reacquires included
    pub total_acquired: usize,

    /// Total instances returned to the inactive set
    pub total_released: usize,

    /// Instances added beyond the configured capacity
    pub grow_events: usize,

    /// Active instances handed out again by a recycling pool
    pub recycle_events: usize,

    /// Template copies destroyed for lacking the poolable capability
    pub capability_failures: usize,

    /// Current active instances
    pub active_objects: usize,

    /// Current inactive instances
    pub inactive_objects: usize,

    /// Pool utilization ratio (0.0 to 1.0)
    pub utilization: f64,

    /// Configured capacity of the pool
    pub configured_capacity: usize,
}

impl PoolMetrics {
    /// Export metrics as a HashMap
    pub fn export(&self) -> HashMap<String, String> {
        let mut metrics = HashMap::new();
        metrics.insert("total_acquired".to_string(), self.total_acquired.to_string());
        metrics.insert("total_released".to_string(), self.total_released.to_string());
        metrics.insert("grow_events".to_string(), self.grow_events.to_string());
        metrics.insert("recycle_events".to_string(), self.recycle_events.to_string());
        metrics.insert(
            "capability_failures".to_string(),
            self.capability_failures.to_string(),
        );
        metrics.insert("active_objects".to_string(), self.active_objects.to_string());
        metrics.insert("inactive_objects".to_string(), self.inactive_objects.to_string());
        metrics.insert("utilization".to_string(), format!("{:.2}", self.utilization));
        metrics.insert(
            "configured_capacity".to_string(),
            self.configured_capacity.to_string(),
        );
        metrics
    }
}

/// Metrics exporter for Prometheus format
#[cfg(feature = "metrics")]
pub struct MetricsExporter;

#[cfg(feature = "metrics")]
impl MetricsExporter {
    /// Export metrics in Prometheus exposition format
    ///
    /// Tags are emitted in key order so the output is stable.
    pub fn export_prometheus(
        metrics: &PoolMetrics,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> String {
        let mut output = String::new();
        let labels = Self::format_labels(pool_name, tags);

        let gauges = [
            (
                "prefabpool_objects_active",
                "Current active instances",
                metrics.active_objects as f64,
            ),
            (
                "prefabpool_objects_inactive",
                "Current inactive instances",
                metrics.inactive_objects as f64,
            ),
            (
                "prefabpool_utilization",
                "Pool utilization ratio",
                metrics.utilization,
            ),
        ];
        for (name, help, value) in gauges {
            output.push_str(&format!("# HELP {} {}\n", name, help));
            output.push_str(&format!("# TYPE {} gauge\n", name));
            output.push_str(&format!(
                "{}{{{}}} {}\n",
                name,
                labels,
                Self::format_value(value)
            ));
        }

        let counters = [
            (
                "prefabpool_objects_acquired_total",
                "Total instances acquired",
                metrics.total_acquired,
            ),
            (
                "prefabpool_objects_released_total",
                "Total instances released",
                metrics.total_released,
            ),
            (
                "prefabpool_grow_events_total",
                "Instances created beyond configured capacity",
                metrics.grow_events,
            ),
            (
                "prefabpool_recycle_events_total",
                "Active instances forcibly reacquired",
                metrics.recycle_events,
            ),
            (
                "prefabpool_capability_failures_total",
                "Template copies destroyed for lacking the poolable capability",
                metrics.capability_failures,
            ),
        ];
        for (name, help, value) in counters {
            output.push_str(&format!("# HELP {} {}\n", name, help));
            output.push_str(&format!("# TYPE {} counter\n", name));
            output.push_str(&format!("{}{{{}}} {}\n", name, labels, value));
        }

        output
    }

    fn format_value(value: f64) -> String {
        if value.fract() == 0.0 {
            format!("{}", value as u64)
        } else {
            format!("{:.2}", value)
        }
    }

    fn format_labels(pool_name: &str, tags: Option<&HashMap<String, String>>) -> String {
        let mut labels = vec![format!("pool=\"{}\"", pool_name)];

        if let Some(tags) = tags {
            let mut sorted: Vec<_> = tags.iter().collect();
            sorted.sort();
            for (key, value) in sorted {
                labels.push(format!("{}=\"{}\"", key, value));
            }
        }

        labels.join(",")
    }
}

/// Internal counters kept by each pool
#[derive(Debug, Default, Clone)]
pub(crate) struct MetricsTracker {
    pub total_acquired: usize,
    pub total_released: usize,
    pub grow_events: usize,
    pub recycle_events: usize,
    pub capability_failures: usize,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_metrics(&self, active: usize, inactive: usize, capacity: usize) -> PoolMetrics {
        let total = active + inactive;
        let utilization = if total > 0 {
            active as f64 / total as f64
        } else {
            0.0
        };

        PoolMetrics {
            total_acquired: self.total_acquired,
            total_released: self.total_released,
            grow_events: self.grow_events,
            recycle_events: self.recycle_events,
            capability_failures: self.capability_failures,
            active_objects: active,
            inactive_objects: inactive,
            utilization,
            configured_capacity: capacity,
        }
    }
}

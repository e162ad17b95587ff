//! Health monitoring for pools

/// Health status of one pool
///
/// A pool that had to grow past its configured capacity is undersized and
/// reported unhealthy, as is a pool running above 90% utilization.
///
/// # Examples
///
/// ```
/// use prefab_pool::HealthStatus;
///
/// let health = HealthStatus::new(1, 2, 3, 0);
/// assert!(health.is_healthy());
/// assert_eq!(health.inactive_objects, 2);
/// ```
#[derive(Debug, Clone)]
pub struct HealthStatus {
    /// Whether the pool is healthy
    pub is_healthy: bool,

    /// Number of warnings detected
    pub warning_count: usize,

    /// Current pool utilization (0.0 to 1.0)
    pub utilization: f64,

    /// Active instances count
    pub active_objects: usize,

    /// Inactive instances count
    pub inactive_objects: usize,

    /// Configured capacity
    pub configured_capacity: usize,

    /// Instances created beyond the configured capacity
    pub grown_by: usize,

    /// Warning messages
    pub warnings: Vec<String>,
}

impl HealthStatus {
    /// Create a new health status
    pub fn new(active: usize, inactive: usize, capacity: usize, grown_by: usize) -> Self {
        let total = active + inactive;
        let utilization = if total > 0 {
            active as f64 / total as f64
        } else {
            0.0
        };

        let mut warnings = Vec::new();
        let mut is_healthy = true;

        if utilization > 0.9 {
            warnings.push(format!("High utilization: {:.1}%", utilization * 100.0));
            is_healthy = false;
        }

        if grown_by > 0 {
            warnings.push(format!(
                "Pool is undersized: grew by {} beyond its capacity of {}",
                grown_by, capacity
            ));
            is_healthy = false;
        }

        if inactive == 0 && total > 0 {
            warnings.push("Pool is exhausted".to_string());
        }

        Self {
            is_healthy,
            warning_count: warnings.len(),
            utilization,
            active_objects: active,
            inactive_objects: inactive,
            configured_capacity: capacity,
            grown_by,
            warnings,
        }
    }

    /// Check if the pool is healthy
    pub fn is_healthy(&self) -> bool {
        self.is_healthy
    }
}

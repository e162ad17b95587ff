//! Feeding pool entries into a registry at startup

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::{PoolEntry, PoolManifest};
use crate::errors::{PoolError, PoolResult};
use crate::registry::{InitReport, PoolRegistry, SharedPoolRegistry};
use crate::template::TemplateLibrary;

/// Anything that can supply the ordered list of pool entries
#[async_trait]
pub trait EntrySource: Send + Sync {
    async fn load(&self) -> PoolResult<Vec<PoolEntry>>;
}

/// Entries known up front
#[derive(Debug, Clone, Default)]
pub struct StaticEntries(pub Vec<PoolEntry>);

#[async_trait]
impl EntrySource for StaticEntries {
    async fn load(&self) -> PoolResult<Vec<PoolEntry>> {
        Ok(self.0.clone())
    }
}

/// Entries read from a JSON [`PoolManifest`] file
///
/// ```json
/// { "pools": [ { "template": "Rock", "capacity": 3, "overflow": "grow" } ] }
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a manifest from a JSON string
    pub fn parse(json: &str) -> PoolResult<Vec<PoolEntry>> {
        let manifest: PoolManifest = serde_json::from_str(json)?;
        Ok(manifest.pools)
    }
}

#[async_trait]
impl EntrySource for JsonFileSource {
    async fn load(&self) -> PoolResult<Vec<PoolEntry>> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|err| PoolError::Io(format!("{}: {}", self.path.display(), err)))?;
        let entries = Self::parse(&json)?;
        debug!(path = %self.path.display(), entries = entries.len(), "Loaded pool manifest");
        Ok(entries)
    }
}

/// Loads entries once and hands them to a registry's `initialize`
pub struct PoolDataSender<S> {
    source: S,
    timeout: Duration,
}

impl<S: EntrySource> PoolDataSender<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            timeout: Duration::from_secs(30),
        }
    }

    /// Set how long loading may take before giving up
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load the entries without touching any registry
    pub async fn load(&self) -> PoolResult<Vec<PoolEntry>> {
        tokio::time::timeout(self.timeout, self.source.load())
            .await
            .map_err(|_| PoolError::Timeout(self.timeout))?
    }

    /// Load the entries, then initialize `registry` with them.
    ///
    /// A load failure leaves the registry untouched.
    pub async fn send<L: TemplateLibrary>(
        &self,
        registry: &mut PoolRegistry<L>,
    ) -> PoolResult<InitReport> {
        let entries = self.load().await?;
        let report = registry.initialize(entries);
        Self::log_report(&report);
        Ok(report)
    }

    /// Same as [`send`](Self::send) for a shared registry
    pub async fn send_shared<L: TemplateLibrary>(
        &self,
        registry: &SharedPoolRegistry<L>,
    ) -> PoolResult<InitReport> {
        let entries = self.load().await?;
        let report = registry.initialize(entries);
        Self::log_report(&report);
        Ok(report)
    }

    fn log_report(report: &InitReport) {
        info!(
            pools = report.pools_created,
            instances = report.instances_created,
            skipped = report.skipped.len(),
            "Pools initialized"
        );
    }
}

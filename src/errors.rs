//! Error types for the pool registry

use std::time::Duration;

use thiserror::Error;

use crate::template::TemplateId;

/// Diagnostics raised while building or feeding pools.
///
/// Gameplay-facing calls never return these: acquire yields `Option` and
/// release is a no-op on anything it cannot resolve. They surface through
/// logging, the [`InitReport`](crate::InitReport) and the config loader.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Template {0} is not registered with the pool registry")]
    UnknownTemplate(TemplateId),

    #[error("Template {0} does not resolve to a valid template")]
    InvalidTemplate(TemplateId),

    #[error("Template {0} appears more than once in the pool entries")]
    DuplicateTemplate(TemplateId),

    #[error("Invalid template for pooling: instances of {0} do not implement the poolable capability")]
    MissingCapability(TemplateId),

    #[error("Invalid pool configuration: {0}")]
    Config(String),

    #[error("Failed to read pool configuration: {0}")]
    Io(String),

    #[error("Loading pool entries timed out after {0:?}")]
    Timeout(Duration),
}

impl From<serde_json::Error> for PoolError {
    fn from(err: serde_json::Error) -> Self {
        PoolError::Config(err.to_string())
    }
}

pub type PoolResult<T> = Result<T, PoolError>;

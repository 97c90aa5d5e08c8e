//! Provider error types

use thiserror::Error;

/// Provider errors
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Missing required attribute: {0}")]
    MissingAttribute(String),

    #[error("Invalid attribute {name}: {message}")]
    InvalidAttribute { name: String, message: String },

    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("Invalid import id {id}: {message}")]
    InvalidImportId { id: String, message: String },

    #[error("Failed to read data source {key}: {message}")]
    DataSource { key: String, message: String },

    #[error("Resource already managed: {0}")]
    AlreadyManaged(String),

    #[error("State file error: {0}")]
    StateError(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error("API error: {0}")]
    Api(#[from] safetorun::SafetorunError),

    #[error("Configuration error: {0}")]
    Config(#[from] safetorun_config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProviderError>;

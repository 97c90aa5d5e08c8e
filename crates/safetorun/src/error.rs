//! Safetorun client error types

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SafetorunError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("GraphQL error: {}", .0.first().map(String::as_str).unwrap_or("unknown error"))]
    GraphQl(Vec<String>),

    #[error("Response for {0} contained no data")]
    MissingData(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("org already exists: {0}")]
    AlreadyExists(String),

    #[error("delete complete: {0}")]
    DeleteComplete(String),

    #[error("Timed out after {elapsed:?} waiting for organisation {organisation_id}")]
    WaitTimeout {
        organisation_id: String,
        elapsed: Duration,
    },

    #[error("Organisation {organisation_id} not settled after {attempts} status checks")]
    AttemptsExhausted {
        organisation_id: String,
        attempts: u32,
    },

    #[error("Organisation {organisation_id} reported ErrorDestroying {count} times in a row")]
    ErrorDestroying { organisation_id: String, count: u32 },

    #[error("Wait for organisation {0} was cancelled")]
    Cancelled(String),
}

impl SafetorunError {
    /// Whether the error came from talking to the API rather than from the
    /// state the organisation ended up in.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::Status { .. }
                | Self::GraphQl(_)
                | Self::MissingData(_)
                | Self::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SafetorunError>;

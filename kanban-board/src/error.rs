//! Error types for the board engine

use serde::Serialize;
use thiserror::Error;

/// Result type for board operations
pub type Result<T> = std::result::Result<T, BoardError>;

/// Errors that can occur while coordinating board mutations
#[derive(Debug, Error)]
pub enum BoardError {
    /// A required field is missing or malformed; raised before any remote call
    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// List not present in the current snapshot
    #[error("list not found: {id}")]
    ListNotFound { id: String },

    /// Card not present in the current snapshot
    #[error("card not found: {id}")]
    CardNotFound { id: String },

    /// The remote store reported an error string
    #[error("{operation} failed: {message}")]
    Remote { operation: String, message: String },

    /// The remote store did not answer in time
    #[error("{operation} timed out after {elapsed_ms}ms")]
    Timeout { operation: String, elapsed_ms: u64 },

    /// The remote store answered with something we could not decode
    #[error("malformed {operation} payload: {message}")]
    MalformedPayload { operation: String, message: String },

    /// Another process holds the board file lock
    #[error("board file is locked by another process: {path}")]
    LockBusy { path: String },

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BoardError {
    /// Create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a remote error
    pub fn remote(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a malformed payload error
    pub fn malformed(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// True for errors raised locally, before the remote store was contacted
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::ListNotFound { .. } | Self::CardNotFound { .. }
        )
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Remote { .. } | Self::LockBusy { .. }
        )
    }
}

impl From<figment::Error> for BoardError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

/// Uniform result shape returned to the UI layer.
///
/// Every coordinator mutation resolves to one of these instead of an `Err`,
/// so callers never need error plumbing for expected failures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationOutcome<T = ()> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
}

impl<T> MutationOutcome<T> {
    /// Successful outcome carrying a payload
    pub fn ok(payload: T) -> Self {
        Self {
            success: true,
            message: None,
            payload: Some(payload),
        }
    }

    /// Failed outcome with a user-facing message
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            payload: None,
        }
    }

    /// Get the payload, if the outcome succeeded
    pub fn into_payload(self) -> Option<T> {
        self.payload
    }
}

impl<T> From<Result<T>> for MutationOutcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(payload) => Self::ok(payload),
            Err(error) => Self::failed(error.to_string()),
        }
    }
}

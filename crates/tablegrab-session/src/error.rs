//! Session error types
//!
//! Display strings double as the status line shown to the user.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    /// The tab could not be reached. The user may retry.
    #[error("Unable to reach the page: {0}. Try refreshing.")]
    CommunicationFailure(String),

    #[error("Table {} not found on this page", .index + 1)]
    NoTableFound { index: usize },

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("No rows captured yet")]
    EmptyExport,

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Storage error: {0}")]
    Storage(#[from] tablegrab_storage::StorageError),

    #[error("Export error: {0}")]
    Export(#[from] tablegrab_export::ExportError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SessionError {
    /// Errors after which the session is intact and the action can be retried
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SessionError::CommunicationFailure(_) | SessionError::NoTableFound { .. }
        )
    }
}

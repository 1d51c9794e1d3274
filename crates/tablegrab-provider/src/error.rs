//! Provider error types

use thiserror::Error;

use crate::TabId;

#[derive(Error, Debug)]
pub enum ProviderError {
    /// The tab did not answer: no content script, closed channel, reloaded page.
    #[error("No response from tab {0}")]
    NoResponse(TabId),

    #[error("Message channel error: {0}")]
    Channel(String),

    /// The tab answered with something that is not a valid table payload.
    #[error("Invalid response from tab {tab_id}: {message}")]
    InvalidResponse { tab_id: TabId, message: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProviderError {
    /// True when the tab could not be reached at all, as opposed to
    /// answering with bad data.
    pub fn is_communication_failure(&self) -> bool {
        matches!(self, ProviderError::NoResponse(_) | ProviderError::Channel(_))
    }
}

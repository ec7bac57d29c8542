//! Typed failures reported by the conversation collaborator.

use thiserror::Error;

use crate::conversation::ConversationId;

/// Failure of a single collaborator operation.
///
/// These never escape the panel: each one is converted into a notification
/// at the point where the async result is reconciled.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("conversation not found: {id}")]
    NotFound { id: ConversationId },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for BackendError {
    fn from(e: sqlx::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<anyhow::Error> for BackendError {
    fn from(e: anyhow::Error) -> Self {
        Self::Storage(format!("{:#}", e))
    }
}

impl BackendError {
    /// Worth retrying for reads; mutations surface it to the user instead.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

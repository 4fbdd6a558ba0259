//! Workflow error taxonomy.

use crate::session::SessionError;

/// Errors surfaced by [`MemoryWorkflow`](crate::MemoryWorkflow) operations.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// No active session
    #[error("sign in required")]
    Unauthorized,

    /// Session present but the caller does not own the memory
    #[error("memory belongs to another user")]
    Forbidden,

    /// Missing or malformed input field
    #[error("validation failed: {0}")]
    Validation(String),

    /// Referenced memory or media item does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Relational store rejected an operation
    #[error("persistence error: {0}")]
    Persistence(#[source] journey_store::Error),

    /// Object store rejected a blob
    #[error("upload error: {0}")]
    Upload(#[source] journey_store::Error),

    /// Identity service could not answer the session lookup
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

/// Convenience Result type.
pub type Result<T> = std::result::Result<T, WorkflowError>;

//! Error types for the relational and object stores.

/// Errors that can occur in store operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// SQLite database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem error from the local object store
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport error talking to the hosted object store
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The object store answered with a failure status
    #[error("storage rejected request ({status}): {message}")]
    Storage {
        /// HTTP status code returned by the storage service
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Object path escapes the bucket or is empty
    #[error("invalid object path: {0}")]
    InvalidPath(String),

    /// A stored row could not be decoded into the data model
    #[error("invalid row: {0}")]
    InvalidRow(String),
}

/// Convenience Result type.
pub type Result<T> = std::result::Result<T, Error>;

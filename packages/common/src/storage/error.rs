use thiserror::Error;

/// Errors that can occur during object storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(String),

    /// The store rejected or failed to complete an operation.
    #[error("object store unavailable: {0}")]
    Unavailable(String),

    /// The backend configuration is invalid or incomplete.
    #[error("storage configuration error: {0}")]
    Config(String),

    /// An I/O error occurred while streaming.
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
}

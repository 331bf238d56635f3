use thiserror::Error;

/// Result type for chunker operations
pub type Result<T> = std::result::Result<T, ChunkerError>;

/// Errors that can occur while setting up chunking
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChunkerError {
    /// Caller passed an argument outside its domain (e.g. `chunk_size < 1`)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ChunkerError {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

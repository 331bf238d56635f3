use thiserror::Error;

/// Result type for JSON stream operations
pub type Result<T> = std::result::Result<T, JsonStreamError>;

/// Errors raised while pulling elements out of a JSON document
#[derive(Error, Debug)]
pub enum JsonStreamError {
    /// Reading the underlying input failed
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// An element was structurally complete but did not deserialize
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The document is malformed around `offset`
    #[error("Syntax error at byte {offset}: {message}")]
    SyntaxError { offset: u64, message: String },

    /// No object member matches the requested path
    #[error("Path not found: {0}")]
    PathNotFound(String),

    /// The value at the requested path is not an array
    #[error("Not an array at path: {0}")]
    NotAnArray(String),
}

impl JsonStreamError {
    pub fn syntax(offset: u64, message: impl Into<String>) -> Self {
        Self::SyntaxError {
            offset,
            message: message.into(),
        }
    }
}

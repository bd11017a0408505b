use thiserror::Error;

/// Result type shared by fallible stream callbacks.
pub type Result<T> = std::result::Result<T, StreamError>;

/// Terminal failure carried by an error notification.
///
/// Cloneable and comparable by value so recorded notifications can be
/// asserted on in tests. Once delivered, no further notifications follow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("key selector failed: {0}")]
    Selector(String),

    #[error("source failed: {0}")]
    Source(String),
}

impl StreamError {
    pub fn selector(message: impl Into<String>) -> Self {
        StreamError::Selector(message.into())
    }

    pub fn source(message: impl Into<String>) -> Self {
        StreamError::Source(message.into())
    }
}

/// Invalid operator configuration, surfaced synchronously at construction.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("chunk size must be at least 1")]
    ChunkSize,

    #[error("window length must be at least 1 tick")]
    WindowLength,
}

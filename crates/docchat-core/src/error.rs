//! Error types for docchat

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the docchat system
///
/// Build-time failures (`Chunking`, `IndexLoad`, `StartupConfig`) are fatal to the
/// process that hit them. Per-question failures (`Retrieval`, `Generation`, ...) are
/// reported for the turn and the session carries on; see [`Error::is_recoverable`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("Startup configuration error: {0}")]
    StartupConfig(String),

    #[error("Index load error: {0}")]
    IndexLoad(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Chunking error: {0}")]
    Chunking(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// Whether a chat session can keep going after this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Retrieval(_)
                | Error::Generation(_)
                | Error::Embedding(_)
                | Error::Timeout(_)
                | Error::Network(_)
                | Error::InvalidInput(_)
        )
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

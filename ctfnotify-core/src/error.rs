//! Error types for ctfnotify.

use thiserror::Error;

/// Errors that can occur while loading settings, reading the feed or
/// persisting notification state.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("State file error: {0}")]
    State(String),

    #[error("Feed parse error: {0}")]
    FeedParse(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for ctfnotify operations.
pub type NotifyResult<T> = Result<T, NotifyError>;

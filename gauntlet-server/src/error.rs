//! Server error types

/// Errors that stop the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Listener could not be bound
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model backend could not be constructed
    #[error("Backend error: {0}")]
    Backend(#[from] gauntlet_judge::LlmError),
}

pub type Result<T> = std::result::Result<T, ServerError>;

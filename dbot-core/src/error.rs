//! Error types for the bot core.
//!
//! [`DbotError`] is the top-level error; [`HandlerError`] is used for action handler failures.

use thiserror::Error;

/// Top-level error for dbot (platform transport, handler, user resolution, config, IO).
#[derive(Error, Debug)]
pub enum DbotError {
    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("User resolution failed: {0}")]
    UserResolution(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Errors produced by action handlers.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Handler failed: {0}")]
    Failed(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("State error: {0}")]
    State(String),
}

/// Result type for core operations; uses [`DbotError`].
pub type Result<T> = std::result::Result<T, DbotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_error_converts_into_dbot_error() {
        let err: DbotError = HandlerError::Failed("boom".to_string()).into();
        assert!(matches!(err, DbotError::Handler(HandlerError::Failed(_))));
        assert_eq!(err.to_string(), "Handler error: Handler failed: boom");
    }
}

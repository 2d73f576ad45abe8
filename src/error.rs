//! Error types for recogchan.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecogError {
    // Protocol-level request errors
    #[error("Missing required parameter: {name}")]
    MissingParameter { name: &'static str },

    #[error("Unsupported grammar content type: {content_type}")]
    UnsupportedContentType { content_type: String },

    // Decoder/engine errors
    #[error("Engine failure: {message}")]
    EngineFailure { message: String },

    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Configuration error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    // General I/O errors (grammar persistence, model paths)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecogError {
    /// Shorthand for decoder/engine failures carrying a free-form message.
    pub fn engine(message: impl Into<String>) -> Self {
        RecogError::EngineFailure {
            message: message.into(),
        }
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, RecogError>;

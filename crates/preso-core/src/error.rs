//! Unified error types for preso

use thiserror::Error;

/// Unified error type for all preso operations
#[derive(Error, Debug)]
pub enum PresoError {
    // Credential errors
    #[error("Authentication error: {0}")]
    Auth(String),

    // Remote API errors
    #[error("API error: {0}")]
    Api(String),

    // Browser errors
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

/// Result type alias using PresoError
pub type Result<T> = std::result::Result<T, PresoError>;

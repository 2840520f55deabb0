//! Error types for the Valoriza client

use thiserror::Error;

/// Client error
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned an error
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation requires a signed-in user
    #[error("Not authenticated")]
    Unauthenticated,

    /// Reward costs more than the user has
    #[error("Insufficient points: need {needed}, have {available}")]
    InsufficientPoints { needed: u64, available: u64 },

    /// Local file could not be read or written (session, uploads)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Response body did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ApiError>;

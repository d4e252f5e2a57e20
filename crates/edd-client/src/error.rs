//! EDD Client Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, EddError>;

/// Errors returned by the licensing API client
#[derive(Error, Debug)]
pub enum EddError {
    /// Transport-level failure (connect, timeout, TLS, non-2xx status)
    #[error("Store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error("Store response invalid: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client construction failed
    #[error("Client configuration error: {0}")]
    Config(String),
}

//! Support Kit Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, SupportError>;

/// Errors surfaced by the toolkit
#[derive(Error, Debug)]
pub enum SupportError {
    /// Missing or invalid construction-time input. This aborts the host's
    /// setup of the feature; everything after construction degrades softly.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The host's settings store failed
    #[error("Store error: {0}")]
    Store(String),

    /// The licensing API failed
    #[error("Licensing API error: {0}")]
    Api(#[from] edd_client::EddError),

    /// No bundled or host-override template with this name
    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    /// A host-override template exists but could not be read
    #[error("Template read error: {0}")]
    TemplateRead(#[from] std::io::Error),

    /// The mail transport refused the message
    #[error("Mail error: {0}")]
    Mail(String),
}

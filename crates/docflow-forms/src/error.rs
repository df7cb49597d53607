//! Error types for docflow forms

use thiserror::Error;

use crate::submit::Precondition;

/// Forms error type
#[derive(Error, Debug)]
pub enum FormsError {
    /// Configuration resource could not be read
    #[error("config read error: {0}")]
    ConfigRead(#[from] std::io::Error),

    /// Configuration resource is not valid JSON of the expected shape
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// JSON serialization failed
    #[error("serialize error: {0}")]
    Serialize(String),

    /// Transport failure talking to the webhook
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// Webhook answered with a non-2xx status
    #[error("HTTP error! status: {0}")]
    Status(u16),

    /// Submission refused before any network call
    #[error("{}", .0.notice())]
    Precondition(Precondition),
}

/// Result type for docflow forms
pub type Result<T> = std::result::Result<T, FormsError>;

//! Error types for curio.

use thiserror::Error;

/// Result type alias using curio's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for curio operations.
///
/// Provider and network failures are caught inside the classifier and
/// converted into structured categorization outcomes; they never cross
/// the `classify` boundary as errors. Everything else propagates
/// through this enum.
#[derive(Error, Debug)]
pub enum Error {
    /// No classification credential is configured anywhere.
    #[error("No API key configured")]
    NoCredential,

    /// Provider HTTP request failed (non-2xx status or transport error).
    #[error("Provider request failed: {0}")]
    ProviderRequest(String),

    /// Provider responded, but the payload could not be parsed.
    #[error("Provider response unparseable: {0}")]
    ProviderResponse(String),

    /// Record store operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Queue persistence operation failed.
    #[error("Queue error: {0}")]
    Queue(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::ProviderRequest(e.to_string())
    }
}

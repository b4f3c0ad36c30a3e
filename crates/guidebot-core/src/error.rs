//! GuideBot error type.
//!
//! One enum for the whole workspace. Provider and store failures never
//! escape their boundary layers as panics — they are converted into
//! renderable answers (engine) or `None` sentinels (stores); this enum is
//! what travels in `Result` up to those boundaries.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GuideBotError>;

#[derive(Debug, Error)]
pub enum GuideBotError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level HTTP failure (connection refused, timeout, bad TLS).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The upstream embedding/completion service answered with an error or
    /// a body we could not interpret.
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("API key missing for provider '{0}'")]
    ApiKeyMissing(String),

    #[error("Unknown provider: {0}")]
    ProviderNotFound(String),

    #[error("Knowledge store error: {0}")]
    Knowledge(String),

    #[error("Ingestion error: {0}")]
    Ingestion(String),

    /// Malformed client input. Surfaced synchronously as a 400, never
    /// reaches the retrieval pipeline.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

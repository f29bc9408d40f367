//! Error types for contact store and job operations

use thiserror::Error;

/// Errors raised by the collaborators around name extraction.
///
/// Extraction itself never fails; these cover the contact store, the
/// webhook payload and the bulk job's persistence.
#[derive(Error, Debug)]
pub enum Error {
    /// The contact store asked us to slow down (HTTP 429)
    #[error("rate limited by contact store (429)")]
    RateLimited,

    /// Non-success response from the contact store API
    #[error("contact store returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport-level HTTP failure
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid base URL for the contact store
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Missing or invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the failure is a rate-limit signal worth retrying
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}

/// Result type for contact store and job operations
pub type Result<T> = std::result::Result<T, Error>;

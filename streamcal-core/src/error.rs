//! Error types for streamcal.

use thiserror::Error;

/// Errors that can occur while building or merging calendars.
#[derive(Error, Debug)]
pub enum StreamcalError {
    #[error("TMDB_API_KEY environment variable not set")]
    MissingCredential,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for StreamcalError {
    /// Request URLs carry the API key as a query parameter, so they are
    /// stripped before the error is displayed.
    fn from(err: reqwest::Error) -> Self {
        StreamcalError::Http(err.without_url().to_string())
    }
}

/// Result type alias for streamcal operations.
pub type StreamcalResult<T> = Result<T, StreamcalError>;

//! Error types for the delivery client

use thiserror::Error;

/// Errors that can occur while delivering a document
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level failure: connect, TLS, timeout, I/O
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The document could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid collector URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The collector answered with a non-2xx status
    #[error("collector rejected document ({status})")]
    Rejected {
        /// HTTP status code
        status: u16,
    },

    /// The diagnostic copy could not be written
    #[error("diagnostic dump failed: {0}")]
    Dump(#[from] std::io::Error),
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

//! Error types for industry-papers.
//!
//! Library functions return `Result<T, FetchError>`. Which step an error came
//! from decides whether it is fatal: a failed search aborts the run, a failed
//! record fetch only skips the affected ids.

use thiserror::Error;

/// Main error type for industry-papers operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream answered with a non-success HTTP status
    #[error("Upstream request failed: {code} - {message}")]
    UpstreamRequest {
        /// HTTP status code
        code: u16,
        /// Endpoint and status text
        message: String,
    },

    /// Transport-level failure (connect, timeout, body read)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body is not the JSON/XML we asked for
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias using `FetchError`
pub type Result<T> = std::result::Result<T, FetchError>;

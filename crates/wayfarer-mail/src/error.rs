//! Error types for document sources

use thiserror::Error;

/// Errors that can occur while retrieving documents
#[derive(Error, Debug)]
pub enum SourceError {
    /// Network or transport failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success status from the remote API
    #[error("HTTP {status}: {message}")]
    Status {
        /// Status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Credentials missing, expired or rejected
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Response or message body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Cursor not produced by this source
    #[error("Invalid cursor: {0}")]
    InvalidCursor(String),

    /// Malformed line in an offline corpus
    #[error("Corpus line {line}: {message}")]
    Corpus {
        /// 1-based line number
        line: usize,
        /// Parse failure
        message: String,
    },

    /// Request parameters rejected before any I/O
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Source temporarily unavailable
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) if status == reqwest::StatusCode::UNAUTHORIZED => {
                SourceError::Auth(e.to_string())
            }
            Some(status) => SourceError::Status {
                status: status.as_u16(),
                message: e.to_string(),
            },
            None => SourceError::Http(e.to_string()),
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(e: serde_json::Error) -> Self {
        SourceError::Decode(format!("JSON parsing error: {}", e))
    }
}

//! Error types for the synthesis loop

use thiserror::Error;
use wayfarer_domain::Cursor;

/// Errors that can stop or degrade a synthesis run
///
/// Collaborator errors arrive as their `Display` text so the orchestrator
/// stays generic over sources, oracles and tokenizers.
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// The document source kept failing for the same cursor
    #[error("Retrieval failed after {attempts} attempts: {message}")]
    Retrieval {
        /// Attempts made before giving up
        attempts: u32,
        /// Last source error
        message: String,
    },

    /// Oracle call failed
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// Token counting failed while slicing a prompt
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// The source handed back the cursor it was asked for
    #[error("Cursor did not advance: {0}")]
    CursorStalled(Cursor),

    /// Run state could not be saved or restored
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SynthesisError {
    /// True for failures confined to one document
    ///
    /// These end the current batch but not the run.
    pub fn is_document_failure(&self) -> bool {
        matches!(self, SynthesisError::Oracle(_) | SynthesisError::Tokenizer(_))
    }
}

impl From<serde_json::Error> for SynthesisError {
    fn from(e: serde_json::Error) -> Self {
        SynthesisError::Snapshot(e.to_string())
    }
}

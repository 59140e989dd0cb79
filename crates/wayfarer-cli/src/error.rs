//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Synthesis run failed
    #[error("{0}")]
    Synthesis(#[from] wayfarer_synthesizer::SynthesisError),

    /// Document source failed
    #[error("Source error: {0}")]
    Source(#[from] wayfarer_mail::SourceError),

    /// Rule program invalid
    #[error("Rule error: {0}")]
    Rules(#[from] wayfarer_rules::RuleError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

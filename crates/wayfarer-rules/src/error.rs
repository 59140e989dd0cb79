//! Error types for rule programs

use thiserror::Error;

/// Errors raised while parsing or validating a rule program
#[derive(Error, Debug, PartialEq)]
pub enum RuleError {
    /// Program text is not valid rule JSON
    #[error("Invalid rule program JSON: {0}")]
    Json(String),

    /// A regular expression failed to compile
    #[error("Rule '{rule}': invalid pattern: {message}")]
    InvalidPattern {
        /// Rule name
        rule: String,
        /// Compiler message
        message: String,
    },

    /// A rule has no name
    #[error("Rule at position {0} has an empty name")]
    EmptyName(usize),

    /// A rule declares neither origin nor destination
    #[error("Rule '{0}' extracts no fields")]
    NoFields(String),

    /// A field has no pattern of its own and the rule has none to share
    #[error("Rule '{rule}': field '{field}' has no pattern")]
    MissingPattern {
        /// Rule name
        rule: String,
        /// Field name
        field: &'static str,
    },

    /// A field lists no capture groups
    #[error("Rule '{rule}': field '{field}' lists no capture groups")]
    NoGroups {
        /// Rule name
        rule: String,
        /// Field name
        field: &'static str,
    },

    /// A field reads a capture group its pattern does not define
    #[error("Rule '{rule}': field '{field}' reads group {group} but its pattern has {available} group(s)")]
    GroupOutOfRange {
        /// Rule name
        rule: String,
        /// Field name
        field: &'static str,
        /// Requested group index
        group: usize,
        /// Number of capture groups in the pattern
        available: usize,
    },
}

impl From<serde_json::Error> for RuleError {
    fn from(e: serde_json::Error) -> Self {
        RuleError::Json(e.to_string())
    }
}

//! The extraction program value

use std::fmt;

/// Accumulated extraction logic carried from document to document
///
/// The core treats the text as an opaque artifact and never executes it.
/// A new program fully supersedes the old one; there is no partial merge.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractionProgram(String);

impl ExtractionProgram {
    /// The empty program every run starts from
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Wrap program text
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Program text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when no logic has been synthesized yet
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length of the program text in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Consume and return the text
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ExtractionProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ExtractionProgram {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ExtractionProgram {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

//! Token counters for prompt slicing
//!
//! Counts only need to be close enough to keep prompts inside a model's
//! window, so no vocabulary is loaded.

use std::convert::Infallible;
use wayfarer_domain::traits::Tokenizer;

/// Default characters per token for English text
pub const DEFAULT_CHARS_PER_TOKEN: usize = 4;

/// Character-ratio approximation of a model tokenizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproxTokenizer {
    model: String,
    chars_per_token: usize,
}

impl ApproxTokenizer {
    /// Approximate the vocabulary of `model`
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
        }
    }

    /// Override the characters-per-token ratio
    pub fn with_chars_per_token(mut self, chars_per_token: usize) -> Self {
        self.chars_per_token = chars_per_token.max(1);
        self
    }
}

impl Tokenizer for ApproxTokenizer {
    type Error = Infallible;

    fn count_tokens(&self, text: &str) -> Result<usize, Infallible> {
        Ok(text.chars().count().div_ceil(self.chars_per_token))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// One token per character
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharTokenizer;

impl Tokenizer for CharTokenizer {
    type Error = Infallible;

    fn count_tokens(&self, text: &str) -> Result<usize, Infallible> {
        Ok(text.chars().count())
    }

    fn model(&self) -> &str {
        "chars"
    }
}

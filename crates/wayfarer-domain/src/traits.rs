//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the synthesis loop and its
//! collaborators. Implementations live in other crates.

use crate::{Batch, Cursor};

/// A paginated, query-matched document source
///
/// Implemented by the infrastructure layer (wayfarer-mail)
pub trait DocumentSource {
    /// Error type for retrieval operations
    type Error;

    /// Fetch one page of documents matching `query`
    ///
    /// `cursor == None` requests the first page. The returned batch's
    /// `next_cursor` must be forwarded verbatim to get the following page.
    fn search(
        &mut self,
        query: &str,
        batch_size: usize,
        cursor: Option<&Cursor>,
    ) -> Result<Batch, Self::Error>;
}

/// A black-box text-completion service
///
/// Implemented by the infrastructure layer (wayfarer-llm). Output carries
/// no structural guarantee, and every call may fail.
pub trait Oracle {
    /// Error type for completion calls
    type Error;

    /// Complete the given prompt
    fn complete(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Identifier of the serving model, for logs
    fn model_name(&self) -> &str {
        "oracle"
    }
}

/// Token counting capability for a particular model vocabulary
///
/// Approximate counts are acceptable.
pub trait Tokenizer {
    /// Error type for counting
    type Error;

    /// Count the tokens in `text`
    fn count_tokens(&self, text: &str) -> Result<usize, Self::Error>;

    /// Model whose vocabulary is being approximated
    fn model(&self) -> &str;
}

//! Token-budget slicing
//!
//! Oversized prompts are cut from the end: the head of an email (sender,
//! summary, itinerary) matters more than its footer. A text far beyond any
//! model window first keeps only its trailing `hard_char_ceiling` characters.

use tracing::{debug, warn};
use wayfarer_domain::traits::Tokenizer;

/// Result of fitting a text into a token budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sliced {
    /// The fitted text
    pub text: String,

    /// Token count of `text`
    pub tokens: usize,

    /// Length in characters right after the hard clamp, if it fired
    pub clamped_chars: Option<usize>,

    /// Number of soft-shrink iterations
    pub shrinks: usize,
}

impl Sliced {
    /// True when the input came back unchanged
    pub fn is_untouched(&self) -> bool {
        self.clamped_chars.is_none() && self.shrinks == 0
    }
}

/// Shrinks text until it fits a token ceiling
#[derive(Debug, Clone)]
pub struct TokenBudgetSlicer<T> {
    tokenizer: T,
    hard_char_ceiling: usize,
    shrink_step_chars: usize,
}

impl<T: Tokenizer> TokenBudgetSlicer<T> {
    /// Create a slicer
    ///
    /// Zero ceilings or steps are raised to one character.
    pub fn new(tokenizer: T, hard_char_ceiling: usize, shrink_step_chars: usize) -> Self {
        Self {
            tokenizer,
            hard_char_ceiling: hard_char_ceiling.max(1),
            shrink_step_chars: shrink_step_chars.max(1),
        }
    }

    /// The injected tokenizer
    pub fn tokenizer(&self) -> &T {
        &self.tokenizer
    }

    /// Keep at most the trailing `hard_char_ceiling` characters
    pub fn clamp<'a>(&self, text: &'a str) -> &'a str {
        let chars = text.chars().count();
        if chars <= self.hard_char_ceiling {
            return text;
        }
        match text.char_indices().nth(chars - self.hard_char_ceiling) {
            Some((start, _)) => &text[start..],
            None => "",
        }
    }

    /// Fit `text` within `limit` tokens
    ///
    /// A text already within the limit is returned unchanged. Otherwise the
    /// hard clamp runs first (when the text is over the character ceiling),
    /// then fixed-size suffixes are dropped until the count fits. An empty
    /// text that still does not fit is returned as is.
    pub fn fit(&self, text: &str, limit: usize) -> Result<Sliced, T::Error> {
        let mut current = text;
        let mut clamped_chars = None;
        let mut shrinks = 0;

        loop {
            let tokens = self.tokenizer.count_tokens(current)?;
            if tokens <= limit {
                if shrinks > 0 || clamped_chars.is_some() {
                    debug!(
                        "Sliced {} -> {} chars ({} tokens, limit {})",
                        text.len(),
                        current.len(),
                        tokens,
                        limit
                    );
                }
                return Ok(Sliced {
                    text: current.to_string(),
                    tokens,
                    clamped_chars,
                    shrinks,
                });
            }

            if current.is_empty() {
                warn!("Empty text still exceeds {} tokens; sending as is", limit);
                return Ok(Sliced {
                    text: String::new(),
                    tokens,
                    clamped_chars,
                    shrinks,
                });
            }

            if clamped_chars.is_none() && current.chars().count() > self.hard_char_ceiling {
                current = self.clamp(current);
                clamped_chars = Some(current.chars().count());
                warn!(
                    "Text of {} tokens clamped to its last {} characters",
                    tokens, self.hard_char_ceiling
                );
                continue;
            }

            debug!("{} tokens exceeds limit {}, dropping {} chars", tokens, limit, self.shrink_step_chars);
            current = drop_suffix(current, self.shrink_step_chars);
            shrinks += 1;
        }
    }
}

/// Remove the last `count` characters
fn drop_suffix(text: &str, count: usize) -> &str {
    let chars = text.chars().count();
    if chars <= count {
        return "";
    }
    match text.char_indices().nth(chars - count) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

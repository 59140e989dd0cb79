//! Documents, batches and pagination cursors

use std::collections::HashMap;
use std::fmt;

/// Opaque continuation token handed out by a document source
///
/// The core never inspects a cursor's contents. It only forwards it back to
/// the source that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a source-specific token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Cursor {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Cursor {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A single retrieved message, already decoded to plain text
///
/// Documents are immutable once retrieved.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Source-assigned identifier
    pub id: String,

    /// Decoded plain-text body
    pub body: String,

    /// Free-form metadata (thread id, snippet, ...)
    pub metadata: HashMap<String, String>,
}

impl Document {
    /// Create a document without metadata
    ///
    /// # Examples
    ///
    /// ```
    /// use wayfarer_domain::Document;
    ///
    /// let doc = Document::new("msg-1", "Your flight from SEA to JFK")
    ///     .with_metadata("thread_id", "t-1");
    /// assert_eq!(doc.metadata.get("thread_id").map(String::as_str), Some("t-1"));
    /// ```
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// One page of documents plus the cursor for the following page
///
/// `next_cursor == None` is the only signal that the source is exhausted;
/// an empty `documents` list on its own means nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Batch {
    /// Documents in source order
    pub documents: Vec<Document>,

    /// Continuation token, absent when no more pages exist
    pub next_cursor: Option<Cursor>,
}

impl Batch {
    /// Create a batch
    pub fn new(documents: Vec<Document>, next_cursor: Option<Cursor>) -> Self {
        Self {
            documents,
            next_cursor,
        }
    }

    /// True when the source has nothing more to give: no documents and no cursor
    pub fn is_exhausted(&self) -> bool {
        self.documents.is_empty() && self.next_cursor.is_none()
    }

    /// True when the source reported more pages after this one
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_batch_without_cursor_is_exhausted() {
        let batch = Batch::new(Vec::new(), None);
        assert!(batch.is_exhausted());
        assert!(!batch.has_more());
    }

    #[test]
    fn test_empty_batch_with_cursor_is_not_exhausted() {
        let batch = Batch::new(Vec::new(), Some(Cursor::new("tok")));
        assert!(!batch.is_exhausted());
        assert!(batch.has_more());
    }

    #[test]
    fn test_final_page_with_documents_is_not_exhausted() {
        let batch = Batch::new(vec![Document::new("a", "body")], None);
        assert!(!batch.is_exhausted());
        assert!(!batch.has_more());
    }

    #[test]
    fn test_cursor_display() {
        let cursor = Cursor::from("page-7");
        assert_eq!(cursor.to_string(), "page-7");
        assert_eq!(cursor.as_str(), "page-7");
    }
}

//! Scripted in-memory source

use crate::SourceError;
use std::collections::HashMap;
use wayfarer_domain::traits::DocumentSource;
use wayfarer_domain::{Batch, Cursor, Document};

/// Document source serving pre-built pages
///
/// Pages are keyed by the cursor that requests them (`None` for the first
/// page). Every request is recorded, and failures can be injected ahead of
/// the next calls. Queries are ignored.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pages: HashMap<Option<String>, Batch>,
    requests: Vec<Option<Cursor>>,
    pending_failures: usize,
}

impl MemorySource {
    /// Create a source with no pages
    pub fn new() -> Self {
        Self::default()
    }

    /// Split documents into pages of `page_size`, chained by cursors `"1"`, `"2"`, ...
    pub fn from_documents(documents: Vec<Document>, page_size: usize) -> Self {
        let mut source = Self::new();
        let page_size = page_size.max(1);
        let chunks: Vec<Vec<Document>> = documents.chunks(page_size).map(<[Document]>::to_vec).collect();
        let count = chunks.len();

        if count == 0 {
            return source.with_page(None, Batch::default());
        }
        for (index, chunk) in chunks.into_iter().enumerate() {
            let key = (index > 0).then(|| index.to_string());
            let next = (index + 1 < count).then(|| Cursor::new((index + 1).to_string()));
            source = source.with_page(key.as_deref(), Batch::new(chunk, next));
        }
        source
    }

    /// Serve `batch` for requests carrying `cursor`
    pub fn with_page(mut self, cursor: Option<&str>, batch: Batch) -> Self {
        self.pages.insert(cursor.map(str::to_string), batch);
        self
    }

    /// Fail the next `count` searches with `SourceError::Unavailable`
    pub fn fail_next(&mut self, count: usize) {
        self.pending_failures += count;
    }

    /// Cursors requested so far, oldest first
    pub fn requests(&self) -> &[Option<Cursor>] {
        &self.requests
    }
}

impl DocumentSource for MemorySource {
    type Error = SourceError;

    fn search(
        &mut self,
        _query: &str,
        _batch_size: usize,
        cursor: Option<&Cursor>,
    ) -> Result<Batch, SourceError> {
        self.requests.push(cursor.cloned());

        if self.pending_failures > 0 {
            self.pending_failures -= 1;
            return Err(SourceError::Unavailable("injected failure".to_string()));
        }

        let key = cursor.map(|c| c.as_str().to_string());
        self.pages
            .get(&key)
            .cloned()
            .ok_or_else(|| SourceError::InvalidCursor(key.unwrap_or_else(|| "<first page>".to_string())))
    }
}

//! Offline JSONL corpus source

use crate::SourceError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use wayfarer_domain::traits::DocumentSource;
use wayfarer_domain::{Batch, Cursor, Document};

#[derive(Debug, Deserialize)]
struct Record {
    #[serde(default)]
    id: Option<String>,
    body: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

/// Document source reading a JSON-lines corpus
///
/// Each non-blank line is `{"id": ..., "body": ..., "metadata": {...}}`;
/// `id` defaults to `line-N`. A query matches a document when every
/// whitespace-separated term occurs in its body, ignoring case. Cursors are
/// decimal offsets into the matching documents.
#[derive(Debug, Clone)]
pub struct JsonlSource {
    documents: Vec<Document>,
}

impl JsonlSource {
    /// Load a corpus file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let source = Self::parse(&contents)?;
        info!("Loaded {} documents from {}", source.len(), path.display());
        Ok(source)
    }

    /// Parse corpus text
    pub fn parse(contents: &str) -> Result<Self, SourceError> {
        let documents = contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                let number = index + 1;
                let record: Record = serde_json::from_str(line).map_err(|e| SourceError::Corpus {
                    line: number,
                    message: e.to_string(),
                })?;
                let id = record
                    .id
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| format!("line-{}", number));
                Ok(Document {
                    id,
                    body: record.body,
                    metadata: record.metadata,
                })
            })
            .collect::<Result<Vec<_>, SourceError>>()?;
        Ok(Self { documents })
    }

    /// Wrap documents already in memory
    pub fn from_documents(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    /// Number of documents in the corpus
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True when the corpus holds no documents
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// All documents, in file order
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }
}

fn matches(body: &str, terms: &[String]) -> bool {
    let body = body.to_lowercase();
    terms.iter().all(|term| body.contains(term.as_str()))
}

impl DocumentSource for JsonlSource {
    type Error = SourceError;

    fn search(
        &mut self,
        query: &str,
        batch_size: usize,
        cursor: Option<&Cursor>,
    ) -> Result<Batch, SourceError> {
        if batch_size == 0 {
            return Err(SourceError::InvalidRequest("batch size must be positive".to_string()));
        }

        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        let matching: Vec<&Document> = self
            .documents
            .iter()
            .filter(|doc| matches(&doc.body, &terms))
            .collect();

        let start = match cursor {
            None => 0,
            Some(cursor) => cursor
                .as_str()
                .parse::<usize>()
                .ok()
                .filter(|&offset| offset <= matching.len())
                .ok_or_else(|| SourceError::InvalidCursor(cursor.to_string()))?,
        };
        let end = (start + batch_size).min(matching.len());

        let documents: Vec<Document> = matching[start..end].iter().map(|&doc| doc.clone()).collect();
        let next_cursor = (end < matching.len()).then(|| Cursor::new(end.to_string()));
        debug!("JSONL page {}..{} of {} matches", start, end, matching.len());

        Ok(Batch::new(documents, next_cursor))
    }
}

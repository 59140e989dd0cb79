//! Batch-wise walking of a document source

use crate::error::SynthesisError;
use std::fmt::Display;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};
use wayfarer_domain::traits::DocumentSource;
use wayfarer_domain::{Batch, Cursor};

/// Fetches fixed-size batches for one query
///
/// Failed fetches are retried with the same cursor. A source that answers
/// with the cursor it was given would loop forever, so that is an error.
pub struct DocumentPager<S> {
    source: S,
    query: String,
    batch_size: usize,
    max_attempts: u32,
    retry_delay: Duration,
    retries: u64,
}

impl<S> DocumentPager<S>
where
    S: DocumentSource,
    S::Error: Display,
{
    /// Create a pager with a single attempt per fetch
    pub fn new(source: S, query: impl Into<String>, batch_size: usize) -> Self {
        Self {
            source,
            query: query.into(),
            batch_size: batch_size.max(1),
            max_attempts: 1,
            retry_delay: Duration::ZERO,
            retries: 0,
        }
    }

    /// Retry failed fetches
    pub fn with_retries(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    /// The wrapped source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Query sent with every fetch
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Fetch attempts that had to be repeated so far
    pub fn retries(&self) -> u64 {
        self.retries
    }

    /// Fetch the batch at `cursor` (`None` for the first page)
    pub fn next_batch(&mut self, cursor: Option<&Cursor>) -> Result<Batch, SynthesisError> {
        let mut attempt = 0;
        let batch = loop {
            attempt += 1;
            match self.source.search(&self.query, self.batch_size, cursor) {
                Ok(batch) => break batch,
                Err(e) if attempt < self.max_attempts => {
                    warn!(
                        "Fetch attempt {}/{} failed: {}; retrying in {:?}",
                        attempt, self.max_attempts, e, self.retry_delay
                    );
                    self.retries += 1;
                    if !self.retry_delay.is_zero() {
                        thread::sleep(self.retry_delay);
                    }
                }
                Err(e) => {
                    return Err(SynthesisError::Retrieval {
                        attempts: attempt,
                        message: e.to_string(),
                    })
                }
            }
        };

        if let (Some(requested), Some(next)) = (cursor, batch.next_cursor.as_ref()) {
            if requested == next {
                return Err(SynthesisError::CursorStalled(next.clone()));
            }
        }

        debug!(
            "Fetched {} documents (more: {})",
            batch.documents.len(),
            batch.has_more()
        );
        Ok(batch)
    }

    /// Lazily walk every batch from `cursor` on
    pub fn batches(&mut self, cursor: Option<Cursor>) -> BatchCursor<'_, S> {
        BatchCursor {
            pager: self,
            cursor,
            finished: false,
        }
    }
}

/// Iterator over the batches of a pager
///
/// Ends after the batch without a continuation cursor, or after the first
/// error.
pub struct BatchCursor<'a, S> {
    pager: &'a mut DocumentPager<S>,
    cursor: Option<Cursor>,
    finished: bool,
}

impl<S> BatchCursor<'_, S> {
    /// Cursor of the next batch to fetch
    pub fn position(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }
}

impl<S> Iterator for BatchCursor<'_, S>
where
    S: DocumentSource,
    S::Error: Display,
{
    type Item = Result<Batch, SynthesisError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.pager.next_batch(self.cursor.as_ref()) {
            Ok(batch) => {
                match &batch.next_cursor {
                    Some(next) => self.cursor = Some(next.clone()),
                    None => self.finished = true,
                }
                Some(Ok(batch))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_domain::Document;
    use wayfarer_mail::MemorySource;

    fn docs(n: usize) -> Vec<Document> {
        (0..n).map(|i| Document::new(format!("d{}", i), "body")).collect()
    }

    #[test]
    fn test_batches_walk_all_pages() {
        let mut pager = DocumentPager::new(MemorySource::from_documents(docs(5), 2), "q", 2);
        let sizes: Vec<usize> = pager
            .batches(None)
            .map(|batch| batch.unwrap().documents.len())
            .collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn test_empty_page_with_cursor_continues() {
        let source = MemorySource::new()
            .with_page(None, Batch::new(vec![], Some(Cursor::new("tok"))))
            .with_page(Some("tok"), Batch::new(docs(1), None));
        let mut pager = DocumentPager::new(source, "q", 4);

        let batches: Vec<Batch> = pager.batches(None).collect::<Result<_, _>>().unwrap();
        assert_eq!(batches.len(), 2);
        assert!(batches[0].documents.is_empty());
    }

    #[test]
    fn test_retries_same_cursor() {
        let mut source = MemorySource::from_documents(docs(1), 4);
        source.fail_next(2);
        let mut pager = DocumentPager::new(source, "q", 4).with_retries(3, Duration::ZERO);

        let batch = pager.next_batch(None).unwrap();
        assert_eq!(batch.documents.len(), 1);
        assert_eq!(pager.retries(), 2);
        assert_eq!(pager.source().requests(), &[None, None, None]);
    }

    #[test]
    fn test_exhausted_retries_fail() {
        let mut source = MemorySource::from_documents(docs(1), 4);
        source.fail_next(5);
        let mut pager = DocumentPager::new(source, "q", 4).with_retries(2, Duration::ZERO);

        let result = pager.next_batch(None);
        assert!(matches!(result, Err(SynthesisError::Retrieval { attempts: 2, .. })));
    }

    #[test]
    fn test_stalled_cursor_detected() {
        let source = MemorySource::new()
            .with_page(None, Batch::new(docs(1), Some(Cursor::new("tok"))))
            .with_page(Some("tok"), Batch::new(docs(1), Some(Cursor::new("tok"))));
        let mut pager = DocumentPager::new(source, "q", 4);

        let results: Vec<_> = pager.batches(None).collect();
        assert_eq!(results.len(), 2);
        assert!(matches!(results[1], Err(SynthesisError::CursorStalled(_))));
    }
}

//! Cross-source behaviour through the `DocumentSource` trait

use std::fs;
use tempfile::TempDir;
use wayfarer_domain::traits::DocumentSource;
use wayfarer_domain::{Cursor, Document};
use wayfarer_mail::{JsonlSource, MemorySource, SourceError};

/// Drain a source, returning document ids in order and the cursors used
fn drain<S>(source: &mut S, query: &str, batch_size: usize) -> (Vec<String>, Vec<Option<Cursor>>)
where
    S: DocumentSource<Error = SourceError>,
{
    let mut ids = Vec::new();
    let mut cursors = Vec::new();
    let mut cursor: Option<Cursor> = None;
    loop {
        cursors.push(cursor.clone());
        let batch = source.search(query, batch_size, cursor.as_ref()).unwrap();
        ids.extend(batch.documents.into_iter().map(|d| d.id));
        match batch.next_cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    (ids, cursors)
}

#[test]
fn test_jsonl_file_drains_in_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("corpus.jsonl");
    let lines: Vec<String> = (0..7)
        .map(|i| format!(r#"{{"id": "m{}", "body": "flight itinerary {}"}}"#, i, i))
        .collect();
    fs::write(&path, lines.join("\n")).unwrap();

    let mut source = JsonlSource::open(&path).unwrap();
    let (ids, cursors) = drain(&mut source, "itinerary", 3);

    assert_eq!(ids, vec!["m0", "m1", "m2", "m3", "m4", "m5", "m6"]);
    assert_eq!(cursors, vec![None, Some(Cursor::new("3")), Some(Cursor::new("6"))]);
}

#[test]
fn test_memory_source_drains_in_order() {
    let docs: Vec<Document> = (0..5).map(|i| Document::new(format!("d{}", i), "body")).collect();
    let mut source = MemorySource::from_documents(docs, 2);
    let (ids, _) = drain(&mut source, "", 2);

    assert_eq!(ids, vec!["d0", "d1", "d2", "d3", "d4"]);
    assert_eq!(source.requests().len(), 3);
}

#[test]
fn test_missing_corpus_file() {
    let result = JsonlSource::open("/nonexistent/corpus.jsonl");
    assert!(matches!(result, Err(SourceError::Io(_))));
}

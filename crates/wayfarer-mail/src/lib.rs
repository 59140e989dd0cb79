//! Wayfarer Mail Sources
//!
//! Implementations of the `DocumentSource` trait from `wayfarer-domain`.
//!
//! # Sources
//!
//! - `GmailSource`: Gmail REST API search with page tokens
//! - `JsonlSource`: Offline corpus, one JSON document per line
//! - `MemorySource`: Scripted pages for tests
//!
//! Every source hands the synthesis loop already-decoded plain text; MIME
//! walking and HTML stripping happen here.
//!
//! # Examples
//!
//! ```
//! use wayfarer_domain::traits::DocumentSource;
//! use wayfarer_domain::Document;
//! use wayfarer_mail::MemorySource;
//!
//! let docs = vec![Document::new("1", "a"), Document::new("2", "b"), Document::new("3", "c")];
//! let mut source = MemorySource::from_documents(docs, 2);
//!
//! let first = source.search("", 2, None).unwrap();
//! assert_eq!(first.documents.len(), 2);
//! let second = source.search("", 2, first.next_cursor.as_ref()).unwrap();
//! assert_eq!(second.documents.len(), 1);
//! assert!(second.next_cursor.is_none());
//! ```

#![warn(missing_docs)]

mod auth;
mod error;
pub mod gmail;
pub mod html;
mod jsonl;
mod memory;
mod mime;

pub use auth::AuthorizedUser;
pub use error::SourceError;
pub use gmail::GmailSource;
pub use html::html_to_text;
pub use jsonl::JsonlSource;
pub use memory::MemorySource;

//! Wayfarer Synthesizer
//!
//! Incrementally synthesizes one flight-itinerary extraction program from a
//! paginated mailbox search.
//!
//! # Overview
//!
//! Every document is shown to an oracle together with the current program.
//! The oracle answers whether the document is an itinerary and, if so, hands
//! back an extended program. Accepted answers replace the program, which the
//! next document's prompt then embeds.
//!
//! # Architecture
//!
//! ```text
//! DocumentPager → Batch → SynthesisOrchestrator
//!                              │ per document
//!                              ▼
//!   PromptComposer (TokenBudgetSlicer) → Oracle → ResponseInterpreter
//!                              │
//!                              ▼
//!                    ExtractionProgramStore
//! ```
//!
//! # Failure policy
//!
//! - Undecodable completions leave the program untouched
//! - Oracle and slicing failures end the current batch; the run moves on
//! - Fetch failures are retried on the same cursor, then stop the run
//! - A cursor that does not advance stops the run
//!
//! # Example Usage
//!
//! ```
//! use wayfarer_domain::Document;
//! use wayfarer_llm::MockProvider;
//! use wayfarer_mail::MemorySource;
//! use wayfarer_synthesizer::{ApproxTokenizer, SynthesisOrchestrator, SynthesizerConfig};
//!
//! let source = MemorySource::from_documents(
//!     vec![Document::new("m1", "Your flight from SEA to JFK is confirmed")],
//!     4,
//! );
//! let oracle = MockProvider::new(
//!     r#"{"was_itinerary": true, "modified_code": true, "code": "def extract(body): ..."}"#,
//! );
//!
//! let mut orchestrator = SynthesisOrchestrator::new(
//!     source,
//!     oracle,
//!     ApproxTokenizer::for_model("gpt-3.5-turbo"),
//!     SynthesizerConfig::default(),
//! )
//! .unwrap();
//!
//! let state = orchestrator.run().unwrap();
//! assert_eq!(state.program.as_str(), "def extract(body): ...");
//! assert_eq!(orchestrator.metrics().itineraries_flagged, 1);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod metrics;
pub mod orchestrator;
pub mod pager;
pub mod parser;
pub mod prompt;
pub mod slicer;
pub mod snapshot;
mod store;
pub mod tokenizer;


pub use config::{ProgramFormat, SynthesizerConfig};
pub use error::SynthesisError;
pub use metrics::RunMetrics;
pub use orchestrator::{BatchObserver, BatchReport, Phase, SynthesisOrchestrator};
pub use pager::{BatchCursor, DocumentPager};
pub use parser::{Interpretation, Rejection, ResponseInterpreter};
pub use prompt::{OracleQuery, PromptComposer};
pub use slicer::{Sliced, TokenBudgetSlicer};
pub use snapshot::{load_state, save_state, SnapshotObserver};
pub use store::ExtractionProgramStore;
pub use tokenizer::{ApproxTokenizer, CharTokenizer};

//! Wayfarer Domain Layer
//!
//! Core model and trait seams for incremental extraction-program synthesis.
//! It performs no I/O: document retrieval, oracle completion and token
//! counting are all reached through the traits in [`traits`].
//!
//! ## Key Concepts
//!
//! - **Document**: one decoded email body plus opaque metadata
//! - **Batch**: one page of documents and the cursor for the next page
//! - **ExtractionProgram**: the accumulated extraction logic, treated as opaque text
//! - **OracleDecision**: what one oracle completion said about one document
//! - **RunState**: cursor + program, everything needed to resume a run
//!
//! ## Architecture
//!
//! - No network, filesystem or async dependencies
//! - Infrastructure implementations live in other crates
//! - Trait definitions for all external interactions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decision;
pub mod document;
pub mod program;
pub mod run_state;
pub mod traits;

// Re-exports for convenience
pub use decision::OracleDecision;
pub use document::{Batch, Cursor, Document};
pub use program::ExtractionProgram;
pub use run_state::{RunId, RunState};

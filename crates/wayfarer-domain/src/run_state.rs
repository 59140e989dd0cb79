//! Run state - everything needed to resume a synthesis run

use crate::{Cursor, ExtractionProgram};
use std::fmt;

/// Identifier for one synthesis run, based on UUIDv7
///
/// UUIDv7 keeps run identifiers sortable by start time, which makes snapshot
/// files from successive runs order naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(u128);

impl RunId {
    /// Generate a new RunId
    ///
    /// # Examples
    ///
    /// ```
    /// use wayfarer_domain::RunId;
    ///
    /// let id = RunId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a RunId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a RunId from its UUID string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid run id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Milliseconds since Unix epoch at which the run started
    pub fn timestamp(&self) -> u64 {
        (self.0 >> 80) as u64
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Mutable state of a synthesis run
///
/// Created with no cursor (start from the beginning) and an empty program.
/// The cursor changes once per batch; the program at most once per document.
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    /// Identifier of the run this state belongs to
    pub run_id: RunId,

    /// Cursor for the next fetch; `None` means start from the beginning
    pub cursor: Option<Cursor>,

    /// Latest accepted extraction program
    pub program: ExtractionProgram,

    /// Number of batches fully handled so far
    pub batches_completed: u64,
}

impl RunState {
    /// Fresh state: no cursor, empty program
    pub fn new() -> Self {
        Self::with_program(ExtractionProgram::empty())
    }

    /// Fresh state seeded with an initial program
    pub fn with_program(program: ExtractionProgram) -> Self {
        Self {
            run_id: RunId::new(),
            cursor: None,
            program,
            batches_completed: 0,
        }
    }

    /// True when the next fetch starts from the first page
    pub fn at_beginning(&self) -> bool {
        self.cursor.is_none() && self.batches_completed == 0
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

//! The accumulated extraction program

use tracing::info;
use wayfarer_domain::{ExtractionProgram, OracleDecision};

/// Holds the current program for the whole run
///
/// Writes replace the text wholesale. The revision counts accepted writes.
#[derive(Debug, Clone, Default)]
pub struct ExtractionProgramStore {
    program: ExtractionProgram,
    revision: u64,
}

impl ExtractionProgramStore {
    /// Start from `program`
    pub fn new(program: ExtractionProgram) -> Self {
        Self { program, revision: 0 }
    }

    /// Current program text
    pub fn read(&self) -> &str {
        self.program.as_str()
    }

    /// Replace the program
    pub fn write(&mut self, text: impl Into<String>) {
        self.program = ExtractionProgram::new(text);
        self.revision += 1;
    }

    /// Apply a decision, returning true when the program was replaced
    ///
    /// Only a decision that claims a change is written, even if one that does
    /// not still carries program text.
    pub fn apply(&mut self, decision: &OracleDecision) -> bool {
        match decision.replacement() {
            Some(text) => {
                let previous = self.program.len();
                self.write(text);
                info!(
                    "Program updated to revision {} ({} -> {} bytes)",
                    self.revision,
                    previous,
                    self.program.len()
                );
                true
            }
            None => false,
        }
    }

    /// Number of accepted writes
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Copy of the current program
    pub fn snapshot(&self) -> ExtractionProgram {
        self.program.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_given_program() {
        let store = ExtractionProgramStore::new(ExtractionProgram::new("X"));
        assert_eq!(store.read(), "X");
        assert_eq!(store.revision(), 0);
        assert_eq!(ExtractionProgramStore::default().read(), "");
    }

    #[test]
    fn test_accepted_update_fully_replaces() {
        let mut store = ExtractionProgramStore::new(ExtractionProgram::new("X"));
        assert!(store.apply(&OracleDecision::decoded(true, true, "Y")));
        assert_eq!(store.read(), "Y");
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn test_unchanged_decision_ignored_even_with_text() {
        let mut store = ExtractionProgramStore::new(ExtractionProgram::new("X"));
        assert!(!store.apply(&OracleDecision::decoded(true, false, "truncated")));
        assert!(!store.apply(&OracleDecision::undecided()));
        assert_eq!(store.read(), "X");
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_update_to_empty_program() {
        let mut store = ExtractionProgramStore::new(ExtractionProgram::new("X"));
        assert!(store.apply(&OracleDecision::decoded(false, true, "")));
        assert_eq!(store.read(), "");
    }
}

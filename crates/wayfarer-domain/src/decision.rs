//! Oracle decisions

/// The structured reading of one oracle completion
///
/// A completion that could not be decoded yields [`OracleDecision::undecided`]:
/// itinerary status unknown, no program change, no program text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleDecision {
    /// Whether the oracle judged the document an itinerary; `None` when unknown
    pub was_itinerary: Option<bool>,

    /// Whether the oracle claims to have modified the program
    pub program_changed: bool,

    /// Program text returned by the oracle; `None` when decoding failed
    pub program: Option<String>,
}

impl OracleDecision {
    /// A fully decoded decision
    pub fn decoded(was_itinerary: bool, program_changed: bool, program: impl Into<String>) -> Self {
        Self {
            was_itinerary: Some(was_itinerary),
            program_changed,
            program: Some(program.into()),
        }
    }

    /// The fallback decision for an undecodable completion
    pub fn undecided() -> Self {
        Self {
            was_itinerary: None,
            program_changed: false,
            program: None,
        }
    }

    /// True when decoding succeeded
    pub fn is_decoded(&self) -> bool {
        self.was_itinerary.is_some()
    }

    /// The replacement program, if this decision carries an accepted update
    ///
    /// Only a decision that both claims a change and carries program text
    /// yields a replacement.
    ///
    /// # Examples
    ///
    /// ```
    /// use wayfarer_domain::OracleDecision;
    ///
    /// let unchanged = OracleDecision::decoded(false, false, "X");
    /// assert_eq!(unchanged.replacement(), None);
    ///
    /// let changed = OracleDecision::decoded(true, true, "Y");
    /// assert_eq!(changed.replacement(), Some("Y"));
    /// ```
    pub fn replacement(&self) -> Option<&str> {
        if self.program_changed {
            self.program.as_deref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undecided_has_no_replacement() {
        let decision = OracleDecision::undecided();
        assert!(!decision.is_decoded());
        assert!(!decision.program_changed);
        assert_eq!(decision.replacement(), None);
    }

    #[test]
    fn test_unchanged_decision_ignores_program_field() {
        let decision = OracleDecision::decoded(true, false, "truncated");
        assert!(decision.is_decoded());
        assert_eq!(decision.replacement(), None);
    }

    #[test]
    fn test_changed_decision_yields_replacement() {
        let decision = OracleDecision::decoded(true, true, "new program");
        assert_eq!(decision.replacement(), Some("new program"));
    }
}

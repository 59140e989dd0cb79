//! Interpret oracle completions as decisions

use crate::config::ProgramFormat;
use serde::Deserialize;
use tracing::{debug, warn};
use wayfarer_domain::OracleDecision;
use wayfarer_rules::RuleSet;

/// The only completion shape that is accepted
#[derive(Debug, Deserialize)]
struct RawDecision {
    was_itinerary: bool,
    modified_code: bool,
    code: String,
}

/// Why a completion was not taken at face value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Not valid JSON of the expected shape
    Decode(String),
    /// Claimed a program change the rule interpreter cannot load
    InvalidRules(String),
}

/// A decision plus the reason it was degraded, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpretation {
    /// Decision to apply
    pub decision: OracleDecision,

    /// Set when the completion was degraded to "no change"
    pub rejection: Option<Rejection>,
}

/// Turns raw completion text into an [`OracleDecision`]
///
/// Never fails: an unusable completion becomes a decision that leaves the
/// program alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseInterpreter {
    format: ProgramFormat,
}

impl ResponseInterpreter {
    /// Create an interpreter for programs in `format`
    pub fn new(format: ProgramFormat) -> Self {
        Self { format }
    }

    /// Decode a completion
    pub fn interpret(&self, completion: &str) -> Interpretation {
        let raw: RawDecision = match serde_json::from_str(completion) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Could not decode oracle response: {}", e);
                debug!("Undecodable response: {:.200}", completion);
                return Interpretation {
                    decision: OracleDecision::undecided(),
                    rejection: Some(Rejection::Decode(e.to_string())),
                };
            }
        };

        if raw.modified_code && self.format == ProgramFormat::Rules {
            if let Err(e) = RuleSet::parse(&raw.code) {
                warn!("Oracle returned an invalid rule set, keeping the current one: {}", e);
                return Interpretation {
                    decision: OracleDecision::decoded(raw.was_itinerary, false, raw.code),
                    rejection: Some(Rejection::InvalidRules(e.to_string())),
                };
            }
        }

        debug!(
            "Oracle decision: itinerary={}, modified={}",
            raw.was_itinerary, raw.modified_code
        );
        Interpretation {
            decision: OracleDecision::decoded(raw.was_itinerary, raw.modified_code, raw.code),
            rejection: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opaque() -> ResponseInterpreter {
        ResponseInterpreter::new(ProgramFormat::Opaque)
    }

    #[test]
    fn test_valid_update() {
        let result = opaque().interpret(r#"{"was_itinerary": true, "modified_code": true, "code": "Y"}"#);
        assert_eq!(result.decision, OracleDecision::decoded(true, true, "Y"));
        assert_eq!(result.decision.replacement(), Some("Y"));
        assert!(result.rejection.is_none());
    }

    #[test]
    fn test_no_change() {
        let result = opaque().interpret(r#"{"was_itinerary": false, "modified_code": false, "code": "X"}"#);
        assert_eq!(result.decision.was_itinerary, Some(false));
        assert_eq!(result.decision.replacement(), None);
    }

    #[test]
    fn test_malformed_completions_are_undecided() {
        let cases = [
            "",
            "not json",
            "{}",
            r#"{"was_itinerary": true, "modified_code": true}"#,
            r#"{"was_itinerary": "yes", "modified_code": true, "code": "Y"}"#,
            r#"{"was_itinerary": true, "modified_code": 1, "code": "Y"}"#,
            r#"{"was_itinerary": true, "modified_code": true, "code": null}"#,
            r#"[true, true, "Y"]"#,
            r#"{"was_itinerary": true, "modified_code": true, "code": "Y""#,
        ];
        for completion in cases {
            let result = opaque().interpret(completion);
            assert_eq!(result.decision, OracleDecision::undecided(), "{:?}", completion);
            assert!(matches!(result.rejection, Some(Rejection::Decode(_))));
        }
    }

    #[test]
    fn test_fenced_json_is_undecided() {
        let completion = "```json\n{\"was_itinerary\": true, \"modified_code\": true, \"code\": \"Y\"}\n```";
        let result = opaque().interpret(completion);
        assert_eq!(result.decision, OracleDecision::undecided());
        assert!(matches!(result.rejection, Some(Rejection::Decode(_))));
    }

    #[test]
    fn test_surrounding_whitespace_tolerated() {
        let completion = "\n  {\"was_itinerary\": false, \"modified_code\": false, \"code\": \"\"}\n";
        assert!(opaque().interpret(completion).decision.is_decoded());
    }

    #[test]
    fn test_extra_fields_ignored() {
        let completion = r#"{"was_itinerary": true, "modified_code": false, "code": "X", "note": "hi"}"#;
        assert!(opaque().interpret(completion).decision.is_decoded());
    }

    #[test]
    fn test_invalid_rules_downgraded() {
        let interpreter = ResponseInterpreter::new(ProgramFormat::Rules);
        let result = interpreter.interpret(
            r#"{"was_itinerary": true, "modified_code": true, "code": "{\"rules\": [{\"name\": \"x\", \"pattern\": \"(a)\", \"origin\": {\"groups\": [2]}}]}"}"#,
        );

        assert_eq!(result.decision.was_itinerary, Some(true));
        assert!(!result.decision.program_changed);
        assert_eq!(result.decision.replacement(), None);
        assert!(matches!(result.rejection, Some(Rejection::InvalidRules(_))));
    }

    #[test]
    fn test_valid_rules_accepted() {
        let interpreter = ResponseInterpreter::new(ProgramFormat::Rules);
        let result = interpreter.interpret(
            r#"{"was_itinerary": true, "modified_code": true, "code": "{\"rules\": [{\"name\": \"x\", \"pattern\": \"(a)\", \"origin\": {\"groups\": [1]}}]}"}"#,
        );
        assert!(result.decision.replacement().is_some());
        assert!(result.rejection.is_none());
    }

    #[test]
    fn test_unchanged_rules_not_validated() {
        let interpreter = ResponseInterpreter::new(ProgramFormat::Rules);
        let result = interpreter.interpret(r#"{"was_itinerary": false, "modified_code": false, "code": "garbage"}"#);
        assert!(result.rejection.is_none());
    }
}

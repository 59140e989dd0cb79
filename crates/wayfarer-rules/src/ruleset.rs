//! Ordered rule collections

use crate::error::RuleError;
use crate::itinerary::Itinerary;
use crate::rule::{Rule, RuleSpec};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Top-level JSON shape of a rule program
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDocument {
    /// Rules in evaluation order
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// Oracles sometimes return a bare array instead of the wrapping object
#[derive(Deserialize)]
#[serde(untagged)]
enum ProgramShape {
    Document(RuleDocument),
    Bare(Vec<RuleSpec>),
}

/// A validated, ordered set of extraction rules
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Parse and validate a rule program
    ///
    /// Blank text is the empty rule set, so a run that starts from an empty
    /// program is always valid.
    pub fn parse(text: &str) -> Result<Self, RuleError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        let specs = match serde_json::from_str::<ProgramShape>(text)? {
            ProgramShape::Document(document) => document.rules,
            ProgramShape::Bare(rules) => rules,
        };
        Self::from_specs(specs)
    }

    /// Compile a list of specifications
    pub fn from_specs(specs: Vec<RuleSpec>) -> Result<Self, RuleError> {
        let rules = specs
            .into_iter()
            .enumerate()
            .map(|(position, spec)| Rule::compile(spec, position))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// The rules in evaluation order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when there are no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every triggered rule against `body`
    ///
    /// A rule contributes an itinerary only when each field it declares was
    /// extracted. Results keep rule order.
    pub fn apply(&self, body: &str) -> Vec<Itinerary> {
        let found: Vec<Itinerary> = self
            .rules
            .iter()
            .filter(|rule| rule.triggers_on(body))
            .filter_map(|rule| {
                rule.extract(body).map(|(origin, destination)| Itinerary {
                    origin,
                    destination,
                    rule: rule.name().to_string(),
                })
            })
            .collect();

        debug!("{} of {} rules produced itineraries", found.len(), self.rules.len());
        found
    }

    /// True when any rule yields an itinerary for `body`
    pub fn is_itinerary(&self, body: &str) -> bool {
        !self.apply(body).is_empty()
    }

    /// Serialized document form
    pub fn to_document(&self) -> RuleDocument {
        RuleDocument {
            rules: self.rules.iter().map(|rule| rule.spec().clone()).collect(),
        }
    }

    /// Pretty JSON program text
    pub fn to_json_pretty(&self) -> Result<String, RuleError> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM: &str = r#"{"rules": [
        {
            "name": "prices",
            "trigger": "Prices shown:",
            "pattern": "Prices shown: ([A-Z]+) to ([A-Z]+)\\.",
            "origin": {"groups": [1]},
            "destination": {"groups": [2]}
        },
        {
            "name": "tripit",
            "trigger": "your trip to",
            "destination": {"pattern": "your trip to (.*?) starts", "groups": [1]}
        }
    ]}"#;

    #[test]
    fn test_blank_program_is_empty_rule_set() {
        assert!(RuleSet::parse("").unwrap().is_empty());
        assert!(RuleSet::parse("  \n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_document_and_bare_array() {
        let document = RuleSet::parse(PROGRAM).unwrap();
        assert_eq!(document.len(), 2);

        let bare = r#"[{"name": "a", "pattern": "(x)", "origin": {"groups": [1]}}]"#;
        assert_eq!(RuleSet::parse(bare).unwrap().len(), 1);
    }

    #[test]
    fn test_apply_respects_triggers() {
        let rules = RuleSet::parse(PROGRAM).unwrap();

        let found = rules.apply("Prices shown: BOS to SFO. Book now");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule, "prices");
        assert_eq!(found[0].origin.as_deref(), Some("BOS"));

        // Pattern text present but trigger missing: nothing fires
        assert!(rules.apply("BOS to SFO.").is_empty());
    }

    #[test]
    fn test_destination_only_rule() {
        let rules = RuleSet::parse(PROGRAM).unwrap();
        let found = rules.apply("Heads up, your trip to Honolulu, HI starts tomorrow");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].origin, None);
        assert_eq!(found[0].destination.as_deref(), Some("Honolulu, HI"));
        assert!(rules.is_itinerary("your trip to Paris starts"));
    }

    #[test]
    fn test_not_json() {
        assert!(matches!(RuleSet::parse("def extract(): pass"), Err(RuleError::Json(_))));
    }

    #[test]
    fn test_serialization_preserves_rules() {
        let rules = RuleSet::parse(PROGRAM).unwrap();
        let text = rules.to_json_pretty().unwrap();
        let reparsed = RuleSet::parse(&text).unwrap();
        assert_eq!(reparsed.to_document(), rules.to_document());
    }
}

//! Rule specifications and their compiled form

use crate::error::RuleError;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Serialized form of one extraction rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Human-readable rule name, usually the sender and email family
    pub name: String,

    /// Substring that must occur in the body for the rule to run; empty runs always
    #[serde(default)]
    pub trigger: String,

    /// Pattern shared by fields that do not bring their own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// How to extract the origin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<FieldSpec>,

    /// How to extract the destination
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<FieldSpec>,
}

/// Serialized form of one field extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Pattern for this field only; falls back to the rule's pattern
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Capture groups whose text forms the field, in order
    pub groups: Vec<usize>,

    /// Separator between group texts
    #[serde(default = "default_join")]
    pub join: String,
}

fn default_join() -> String {
    ", ".to_string()
}

/// A field bound to the pattern it actually reads
#[derive(Debug, Clone)]
struct CompiledField {
    regex: Regex,
    groups: Vec<usize>,
    join: String,
}

impl CompiledField {
    fn extract(&self, body: &str) -> Option<String> {
        let captures = self.regex.captures(body)?;
        let parts = self
            .groups
            .iter()
            .map(|&group| captures.get(group).map(|m| m.as_str().trim()))
            .collect::<Option<Vec<_>>>()?;
        let value = parts.join(&self.join);
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

/// A validated, compiled rule
#[derive(Debug, Clone)]
pub struct Rule {
    spec: RuleSpec,
    origin: Option<CompiledField>,
    destination: Option<CompiledField>,
}

impl Rule {
    /// Compile and validate a rule specification
    ///
    /// `position` is used only for error messages about unnamed rules.
    pub fn compile(spec: RuleSpec, position: usize) -> Result<Self, RuleError> {
        if spec.name.trim().is_empty() {
            return Err(RuleError::EmptyName(position));
        }
        if spec.origin.is_none() && spec.destination.is_none() {
            return Err(RuleError::NoFields(spec.name.clone()));
        }

        let shared = spec
            .pattern
            .as_deref()
            .map(|pattern| compile_pattern(&spec.name, pattern))
            .transpose()?;

        let origin = spec
            .origin
            .as_ref()
            .map(|field| compile_field(&spec.name, "origin", field, shared.as_ref()))
            .transpose()?;
        let destination = spec
            .destination
            .as_ref()
            .map(|field| compile_field(&spec.name, "destination", field, shared.as_ref()))
            .transpose()?;

        Ok(Self {
            spec,
            origin,
            destination,
        })
    }

    /// The rule's name
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// The specification this rule was compiled from
    pub fn spec(&self) -> &RuleSpec {
        &self.spec
    }

    /// True when the body contains this rule's trigger
    pub fn triggers_on(&self, body: &str) -> bool {
        body.contains(self.spec.trigger.as_str())
    }

    /// Extract `(origin, destination)`, or `None` when a declared field misses
    pub fn extract(&self, body: &str) -> Option<(Option<String>, Option<String>)> {
        let origin = match &self.origin {
            Some(field) => Some(field.extract(body)?),
            None => None,
        };
        let destination = match &self.destination {
            Some(field) => Some(field.extract(body)?),
            None => None,
        };
        Some((origin, destination))
    }
}

fn compile_pattern(rule: &str, pattern: &str) -> Result<Regex, RuleError> {
    Regex::new(pattern).map_err(|e| RuleError::InvalidPattern {
        rule: rule.to_string(),
        message: e.to_string(),
    })
}

fn compile_field(
    rule: &str,
    field: &'static str,
    spec: &FieldSpec,
    shared: Option<&Regex>,
) -> Result<CompiledField, RuleError> {
    let regex = match (&spec.pattern, shared) {
        (Some(own), _) => compile_pattern(rule, own)?,
        (None, Some(shared)) => shared.clone(),
        (None, None) => {
            return Err(RuleError::MissingPattern {
                rule: rule.to_string(),
                field,
            })
        }
    };

    if spec.groups.is_empty() {
        return Err(RuleError::NoGroups {
            rule: rule.to_string(),
            field,
        });
    }

    // captures_len counts the implicit whole-match group 0
    let available = regex.captures_len() - 1;
    if let Some(&group) = spec.groups.iter().find(|&&g| g == 0 || g > available) {
        return Err(RuleError::GroupOutOfRange {
            rule: rule.to_string(),
            field,
            group,
            available,
        });
    }

    Ok(CompiledField {
        regex,
        groups: spec.groups.clone(),
        join: spec.join.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(pattern: Option<&str>, groups: &[usize]) -> FieldSpec {
        FieldSpec {
            pattern: pattern.map(str::to_string),
            groups: groups.to_vec(),
            join: default_join(),
        }
    }

    fn spec(pattern: Option<&str>, origin: Option<FieldSpec>, destination: Option<FieldSpec>) -> RuleSpec {
        RuleSpec {
            name: "test".to_string(),
            trigger: String::new(),
            pattern: pattern.map(str::to_string),
            origin,
            destination,
        }
    }

    #[test]
    fn test_shared_pattern_extraction() {
        let rule = Rule::compile(
            spec(
                Some(r"from ([A-Z]{3}) to ([A-Z]{3})"),
                Some(field(None, &[1])),
                Some(field(None, &[2])),
            ),
            0,
        )
        .unwrap();

        let (origin, destination) = rule.extract("Flight from SEA to JFK").unwrap();
        assert_eq!(origin.as_deref(), Some("SEA"));
        assert_eq!(destination.as_deref(), Some("JFK"));
    }

    #[test]
    fn test_joined_groups() {
        let rule = Rule::compile(
            spec(
                Some(r"([A-Z]{3}) ([A-Za-z]+, [A-Z]{2})"),
                Some(field(None, &[1, 2])),
                None,
            ),
            0,
        )
        .unwrap();

        let (origin, destination) = rule.extract("SEA Seattle, WA").unwrap();
        assert_eq!(origin.as_deref(), Some("SEA, Seattle, WA"));
        assert_eq!(destination, None);
    }

    #[test]
    fn test_group_must_exist_in_the_fields_own_pattern() {
        // The destination pattern has one group; reading group 2 is a wiring error
        let result = Rule::compile(
            spec(
                None,
                Some(field(Some(r"mi_origin=3D([A-Z]{3})&"), &[1])),
                Some(field(Some(r"mi_destination=3D([A-Z]{3})&"), &[2])),
            ),
            0,
        );
        assert_eq!(
            result.unwrap_err(),
            RuleError::GroupOutOfRange {
                rule: "test".to_string(),
                field: "destination",
                group: 2,
                available: 1,
            }
        );
    }

    #[test]
    fn test_group_zero_rejected() {
        let result = Rule::compile(spec(Some("(a)"), Some(field(None, &[0])), None), 0);
        assert!(matches!(result, Err(RuleError::GroupOutOfRange { group: 0, .. })));
    }

    #[test]
    fn test_missing_pattern() {
        let result = Rule::compile(spec(None, Some(field(None, &[1])), None), 0);
        assert!(matches!(result, Err(RuleError::MissingPattern { field: "origin", .. })));
    }

    #[test]
    fn test_no_fields() {
        let result = Rule::compile(spec(Some("(a)"), None, None), 0);
        assert!(matches!(result, Err(RuleError::NoFields(_))));
    }

    #[test]
    fn test_empty_name() {
        let mut rule_spec = spec(Some("(a)"), Some(field(None, &[1])), None);
        rule_spec.name = "  ".to_string();
        assert_eq!(Rule::compile(rule_spec, 3).unwrap_err(), RuleError::EmptyName(3));
    }

    #[test]
    fn test_invalid_regex() {
        let result = Rule::compile(spec(Some("(unclosed"), Some(field(None, &[1])), None), 0);
        assert!(matches!(result, Err(RuleError::InvalidPattern { .. })));
    }

    #[test]
    fn test_declared_field_miss_yields_nothing() {
        let rule = Rule::compile(
            spec(
                None,
                Some(field(Some(r"from ([A-Z]{3})"), &[1])),
                Some(field(Some(r"to ([A-Z]{3})"), &[1])),
            ),
            0,
        )
        .unwrap();
        assert!(rule.extract("from SEA only").is_none());
    }
}

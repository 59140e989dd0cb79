//! Built-in rule catalogue
//!
//! Hand-reviewed rules for the email families seen so far. They ship as
//! data and can seed a synthesis run instead of the empty program.

use crate::error::RuleError;
use crate::ruleset::RuleSet;

const CATALOGUE_JSON: &str = include_str!("catalogue.json");

impl RuleSet {
    /// The built-in catalogue as a compiled rule set
    pub fn builtin_catalogue() -> Result<Self, RuleError> {
        Self::parse(CATALOGUE_JSON)
    }

    /// The built-in catalogue as program text
    pub fn builtin_catalogue_text() -> &'static str {
        CATALOGUE_JSON
    }
}

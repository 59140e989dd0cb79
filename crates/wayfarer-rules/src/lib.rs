//! Wayfarer Rules
//!
//! A small declarative representation for synthesized extraction programs.
//!
//! # Overview
//!
//! Instead of executing oracle-written code, a program is an ordered list of
//! rules serialized as JSON. Each rule names a trigger substring and the
//! regular-expression captures that yield an itinerary's origin and
//! destination. The oracle edits the JSON; this crate validates and
//! interprets it without any dynamic code execution.
//!
//! ```text
//! {"rules": [
//!   {"name": "jetblue-prices",
//!    "trigger": "Prices shown:",
//!    "pattern": "Prices shown: ([A-Z]+) to ([A-Z]+)\\.",
//!    "origin": {"groups": [1]},
//!    "destination": {"groups": [2]}}
//! ]}
//! ```
//!
//! # Example Usage
//!
//! ```
//! use wayfarer_rules::RuleSet;
//!
//! let program = r#"{"rules": [{
//!     "name": "jetblue-prices",
//!     "trigger": "Prices shown:",
//!     "pattern": "Prices shown: ([A-Z]+) to ([A-Z]+)\\.",
//!     "origin": {"groups": [1]},
//!     "destination": {"groups": [2]}
//! }]}"#;
//!
//! let rules = RuleSet::parse(program).unwrap();
//! let found = rules.apply("Prices shown: BOS to SFO.");
//! assert_eq!(found[0].origin.as_deref(), Some("BOS"));
//! assert_eq!(found[0].destination.as_deref(), Some("SFO"));
//! ```

#![warn(missing_docs)]

mod catalogue;
mod error;
mod itinerary;
mod rule;
mod ruleset;

pub use error::RuleError;
pub use itinerary::Itinerary;
pub use rule::{FieldSpec, Rule, RuleSpec};
pub use ruleset::{RuleDocument, RuleSet};

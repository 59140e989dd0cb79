//! Extraction output

use serde::{Deserialize, Serialize};

/// One itinerary found in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Itinerary {
    /// Departure place, when the rule extracts one
    pub origin: Option<String>,

    /// Arrival place, when the rule extracts one
    pub destination: Option<String>,

    /// Name of the rule that produced this itinerary
    pub rule: String,
}

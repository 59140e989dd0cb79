//! Counters for a synthesis run

use std::time::Duration;

/// Metrics collected during a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunMetrics {
    /// Batches fetched and handled
    pub batches: u64,

    /// Documents sent to the oracle whose response was interpreted
    pub documents_processed: u64,

    /// Documents dropped because an earlier document in the batch failed
    pub documents_skipped: u64,

    /// Documents the oracle judged to be itineraries
    pub itineraries_flagged: u64,

    /// Accepted program replacements
    pub program_updates: u64,

    /// Completions that could not be decoded
    pub decode_failures: u64,

    /// Program changes rejected as invalid rule sets
    pub rejected_programs: u64,

    /// Documents whose oracle call or slicing failed
    pub document_failures: u64,

    /// Prompts shortened to fit the token limit
    pub truncated_prompts: u64,

    /// Repeated fetch attempts
    pub fetch_retries: u64,

    /// Wall-clock time spent in the run
    pub elapsed: Duration,
}

impl RunMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents seen, whatever happened to them
    pub fn documents_seen(&self) -> u64 {
        self.documents_processed + self.document_failures + self.documents_skipped
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Synthesis Run Summary".to_string(),
            "=====================".to_string(),
            format!("Batches: {}", self.batches),
            format!("Documents seen: {}", self.documents_seen()),
            format!("  Processed: {}", self.documents_processed),
            format!("  Failed: {}", self.document_failures),
            format!("  Skipped: {}", self.documents_skipped),
            format!("Itineraries flagged: {}", self.itineraries_flagged),
            format!("Program updates: {}", self.program_updates),
        ];

        if self.decode_failures > 0 || self.rejected_programs > 0 {
            lines.push(format!("Undecodable responses: {}", self.decode_failures));
            lines.push(format!("Rejected programs: {}", self.rejected_programs));
        }
        if self.truncated_prompts > 0 {
            lines.push(format!("Truncated prompts: {}", self.truncated_prompts));
        }
        if self.fetch_retries > 0 {
            lines.push(format!("Fetch retries: {}", self.fetch_retries));
        }
        lines.push(format!("Elapsed: {:.1}s", self.elapsed.as_secs_f64()));

        lines.join("\n")
    }
}

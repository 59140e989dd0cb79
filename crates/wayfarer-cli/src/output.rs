//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};
use wayfarer_rules::Itinerary;
use wayfarer_synthesizer::{BatchReport, RunMetrics};

/// Itineraries found in one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentMatches {
    /// Document identifier
    pub id: String,

    /// Itineraries in rule order; empty when nothing matched
    pub itineraries: Vec<Itinerary>,
}

/// Output formatter.
#[derive(Debug, Clone)]
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self { format, color_enabled }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Heading printed before the program after each batch.
    pub fn batch_banner(&self, report: &BatchReport) -> String {
        let mut line = format!(
            "=== Program after batch {} ({} docs, {} itineraries, {} updates) ===",
            report.batch_number, report.documents, report.itineraries, report.updates
        );
        if report.skipped > 0 {
            line.push_str(&format!(" [{} skipped]", report.skipped));
        }
        let banner = self.colorize(&line, "cyan");
        match &report.failure {
            Some(failure) => format!(
                "{}\n{}",
                banner,
                self.warning(&format!("Batch ended early: {}", failure))
            ),
            None => banner,
        }
    }

    /// Program text, with a placeholder when nothing has been synthesized yet.
    pub fn program(&self, program: &str) -> String {
        if program.is_empty() {
            self.colorize("(empty program)", "yellow")
        } else {
            program.to_string()
        }
    }

    /// Format the results of applying a rule program.
    pub fn format_matches(&self, matches: &[DocumentMatches]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(matches)?),
            OutputFormat::Table => Ok(self.format_matches_table(matches)),
        }
    }

    fn format_matches_table(&self, matches: &[DocumentMatches]) -> String {
        if matches.is_empty() {
            return self.colorize("No documents matched.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Document", "Rule", "Origin", "Destination"]);

        for document in matches {
            if document.itineraries.is_empty() {
                builder.push_record([document.id.as_str(), "-", "-", "-"]);
            }
            for itinerary in &document.itineraries {
                builder.push_record([
                    document.id.as_str(),
                    itinerary.rule.as_str(),
                    itinerary.origin.as_deref().unwrap_or("-"),
                    itinerary.destination.as_deref().unwrap_or("-"),
                ]);
            }
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format the end-of-run metrics.
    pub fn metrics(&self, metrics: &RunMetrics) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "batches": metrics.batches,
                "documents_processed": metrics.documents_processed,
                "documents_skipped": metrics.documents_skipped,
                "itineraries_flagged": metrics.itineraries_flagged,
                "program_updates": metrics.program_updates,
                "decode_failures": metrics.decode_failures,
                "rejected_programs": metrics.rejected_programs,
                "document_failures": metrics.document_failures,
                "truncated_prompts": metrics.truncated_prompts,
                "fetch_retries": metrics.fetch_retries,
                "elapsed_ms": metrics.elapsed.as_millis() as u64,
            }))?),
            OutputFormat::Table => Ok(metrics.summary()),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().bold().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<DocumentMatches> {
        vec![
            DocumentMatches {
                id: "m1".to_string(),
                itineraries: vec![Itinerary {
                    origin: Some("SEA".to_string()),
                    destination: Some("JFK".to_string()),
                    rule: "alaska".to_string(),
                }],
            },
            DocumentMatches {
                id: "m2".to_string(),
                itineraries: vec![],
            },
        ]
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_matches(&sample()).unwrap();
        assert!(output.contains("Destination"));
        assert!(output.contains("alaska"));
        assert!(output.contains("JFK"));
        assert!(output.contains("m2"));
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_matches(&sample()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["itineraries"][0]["origin"], "SEA");
        assert_eq!(parsed[1]["itineraries"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_empty_matches() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.format_matches(&[]).unwrap(), "No documents matched.");
    }

    #[test]
    fn test_banner_mentions_skips() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let report = BatchReport {
            batch_number: 2,
            documents: 4,
            skipped: 1,
            ..BatchReport::default()
        };
        let banner = formatter.batch_banner(&report);
        assert!(banner.contains("batch 2"));
        assert!(banner.contains("[1 skipped]"));
        assert_eq!(banner.lines().count(), 1);
    }

    #[test]
    fn test_banner_warns_on_batch_failure() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let report = BatchReport {
            batch_number: 1,
            documents: 2,
            skipped: 1,
            failure: Some("tokenizer failed: vocabulary unavailable".to_string()),
            ..BatchReport::default()
        };
        let banner = formatter.batch_banner(&report);
        let warning = banner.lines().nth(1).unwrap_or_default();
        assert!(warning.starts_with("⚠ Batch ended early"));
        assert!(warning.contains("vocabulary unavailable"));
    }

    #[test]
    fn test_empty_program_placeholder() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.program(""), "(empty program)");
        assert_eq!(formatter.program("code"), "code");
    }

    #[test]
    fn test_metrics_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let metrics = RunMetrics {
            batches: 3,
            ..RunMetrics::default()
        };
        let output = formatter.metrics(&metrics).unwrap();
        assert!(output.contains("\"batches\": 3"));
    }

    #[test]
    fn test_no_color() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("done"), "✓ done");
    }
}

//! Apply command implementation.

use crate::cli::ApplyArgs;
use crate::error::{CliError, Result};
use crate::output::{DocumentMatches, Formatter};
use std::fs;
use tracing::debug;
use wayfarer_mail::JsonlSource;
use wayfarer_rules::RuleSet;
use wayfarer_synthesizer::DocumentPager;

const PAGE_SIZE: usize = 100;

/// Execute the apply command.
pub fn execute_apply(args: ApplyArgs, formatter: &Formatter) -> Result<()> {
    let text = fs::read_to_string(&args.program)?;
    let rules = RuleSet::parse(&text)?;
    debug!(rules = rules.len(), "Loaded {}", args.program.display());

    let matches = collect_matches(&args, &rules)?;
    println!("{}", formatter.format_matches(&matches)?);

    let found: usize = matches.iter().map(|m| m.itineraries.len()).sum();
    eprintln!("{}", formatter.info(&format!("{} itineraries found", found)));
    Ok(())
}

/// Run the rules over every requested document
fn collect_matches(args: &ApplyArgs, rules: &RuleSet) -> Result<Vec<DocumentMatches>> {
    let mut matches = Vec::new();

    if let Some(input) = &args.input {
        let body = fs::read_to_string(input)?;
        matches.push(DocumentMatches {
            id: input.display().to_string(),
            itineraries: rules.apply(&body),
        });
    } else if let Some(corpus) = &args.corpus {
        let mut pager = DocumentPager::new(JsonlSource::open(corpus)?, args.query.as_str(), PAGE_SIZE);
        for batch in pager.batches(None) {
            for document in batch?.documents {
                matches.push(DocumentMatches {
                    itineraries: rules.apply(&document.body),
                    id: document.id,
                });
            }
        }
    } else {
        return Err(CliError::InvalidInput(
            "Must specify either --input or --corpus".to_string(),
        ));
    }

    if !args.all {
        matches.retain(|m| !m.itineraries.is_empty());
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const PROGRAM: &str = r#"{"rules": [{
        "name": "route",
        "pattern": "from ([A-Z]{3}) to ([A-Z]{3})",
        "origin": {"groups": [1]},
        "destination": {"groups": [2]}
    }]}"#;

    fn args(program: PathBuf, input: Option<PathBuf>, corpus: Option<PathBuf>, all: bool) -> ApplyArgs {
        ApplyArgs {
            program,
            input,
            corpus,
            query: String::new(),
            all,
        }
    }

    fn rules() -> RuleSet {
        RuleSet::parse(PROGRAM).unwrap()
    }

    #[test]
    fn test_single_input() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("email.txt");
        fs::write(&input, "Your flight from SEA to JFK departs at 9").unwrap();

        let found = collect_matches(&args(PathBuf::new(), Some(input), None, false), &rules()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].itineraries[0].origin.as_deref(), Some("SEA"));
    }

    #[test]
    fn test_corpus_filters_misses_unless_all() {
        let dir = TempDir::new().unwrap();
        let corpus = dir.path().join("mail.jsonl");
        fs::write(
            &corpus,
            concat!(
                "{\"id\": \"hit\", \"body\": \"from BOS to SFO\"}\n",
                "{\"id\": \"miss\", \"body\": \"newsletter\"}\n",
            ),
        )
        .unwrap();

        let hits = collect_matches(&args(PathBuf::new(), None, Some(corpus.clone()), false), &rules()).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "hit");

        let all = collect_matches(&args(PathBuf::new(), None, Some(corpus), true), &rules()).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[1].itineraries.is_empty());
    }

    #[test]
    fn test_invalid_program_rejected() {
        let dir = TempDir::new().unwrap();
        let program = dir.path().join("program.json");
        fs::write(&program, "def extract(body): pass").unwrap();

        let formatter = Formatter::new(crate::config::OutputFormat::Table, false);
        let result = execute_apply(args(program, None, None, false), &formatter);
        assert!(matches!(result, Err(CliError::Rules(_))));
    }
}

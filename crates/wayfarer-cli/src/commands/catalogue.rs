//! Catalogue command implementation.

use crate::cli::CatalogueArgs;
use crate::error::Result;
use crate::output::Formatter;
use std::fs;
use wayfarer_rules::RuleSet;

/// Execute the catalogue command.
pub fn execute_catalogue(args: CatalogueArgs, formatter: &Formatter) -> Result<()> {
    let catalogue = RuleSet::builtin_catalogue()?;
    let text = catalogue.to_json_pretty()?;

    match args.output {
        Some(path) => {
            fs::write(&path, &text)?;
            println!(
                "{}",
                formatter.success(&format!("Wrote {} rules to {}", catalogue.len(), path.display()))
            );
        }
        None => println!("{}", text),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;

    #[test]
    fn test_catalogue_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalogue.json");
        let formatter = Formatter::new(OutputFormat::Table, false);

        execute_catalogue(CatalogueArgs { output: Some(path.clone()) }, &formatter).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(!RuleSet::parse(&written).unwrap().is_empty());
    }
}

//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
pub fn execute_config(args: ConfigArgs, config: &Config, path: &Path, formatter: &Formatter) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            eprintln!("{}", formatter.info(&format!("Configuration file: {}", path.display())));
            println!("{}", config.to_toml()?);
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::InvalidInput(format!(
                    "{} already exists; use --force to overwrite",
                    path.display()
                )));
            }
            Config::default().save_to(path)?;
            println!("{}", formatter.success(&format!("Wrote {}", path.display())));
        }
    }

    Ok(())
}

//! Wayfarer CLI - synthesize flight-itinerary extraction programs from a mailbox.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use wayfarer_cli::commands;
use wayfarer_cli::{Cli, Command, Config, Formatter};

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only program text, tables and JSON
    let default_level = match (cli.quiet, cli.verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> wayfarer_cli::Result<()> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::path()?,
    };
    let config = Config::load_from(&config_path)?;

    let format = cli
        .output_format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Run(args) => {
            commands::execute_run(args, &config, &formatter)?;
        }
        Command::Apply(args) => {
            commands::execute_apply(args, &formatter)?;
        }
        Command::Catalogue(args) => {
            commands::execute_catalogue(args, &formatter)?;
        }
        Command::Config(args) => {
            commands::execute_config(args, &config, &config_path, &formatter)?;
        }
    }

    Ok(())
}

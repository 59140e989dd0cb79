//! Run command implementation.

use crate::backends::{MailSource, OracleClient};
use crate::cli::{RunArgs, SourceArg};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::fs;
use tracing::info;
use wayfarer_domain::traits::Oracle;
use wayfarer_domain::{ExtractionProgram, RunState};
use wayfarer_rules::RuleSet;
use wayfarer_synthesizer::{
    load_state, ApproxTokenizer, BatchReport, ProgramFormat, SnapshotObserver, SynthesisError,
    SynthesisOrchestrator, SynthesizerConfig,
};

/// Execute the run command.
pub fn execute_run(args: RunArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let synthesizer = synthesizer_config(&args, config);

    let mut oracle_settings = config.oracle.clone();
    if let Some(provider) = args.provider {
        oracle_settings.provider = provider.into();
    }
    if let Some(model) = &args.model {
        oracle_settings.model = model.clone();
    }

    let initial = initial_state(&args, &synthesizer)?;

    let source = match args.source {
        SourceArg::Gmail => MailSource::gmail(&config.gmail)?,
        SourceArg::Jsonl => {
            let path = args
                .corpus
                .as_deref()
                .ok_or_else(|| CliError::InvalidInput("--corpus is required with --source jsonl".to_string()))?;
            MailSource::jsonl(path)?
        }
    };
    let oracle = OracleClient::from_settings(&oracle_settings)?;
    let tokenizer = ApproxTokenizer::for_model(oracle.model_name());

    let printer = formatter.clone();
    let mut orchestrator = SynthesisOrchestrator::new(source, oracle, tokenizer, synthesizer)?.with_observer(
        move |state: &RunState, report: &BatchReport| -> std::result::Result<(), SynthesisError> {
            println!("{}", printer.batch_banner(report));
            println!("{}", printer.program(state.program.as_str()));
            Ok(())
        },
    );
    if let Some(path) = &args.snapshot {
        info!(path = %path.display(), "Snapshotting after every batch");
        orchestrator = orchestrator.with_observer(SnapshotObserver::new(path));
    }
    if let Some(state) = initial {
        orchestrator.resume(state);
    }

    let state = orchestrator.run()?;

    if let Some(path) = &args.output {
        fs::write(path, state.program.as_str())?;
        println!(
            "{}",
            formatter.success(&format!("Program written to {}", path.display()))
        );
    }
    if state.cursor.is_some() {
        println!(
            "{}",
            formatter.info(&format!(
                "Stopped after {} batches with more mail to read; resume from a snapshot to continue",
                state.batches_completed
            ))
        );
    }
    println!("{}", formatter.metrics(orchestrator.metrics())?);

    Ok(())
}

/// Configured synthesizer settings with command-line overrides applied
fn synthesizer_config(args: &RunArgs, config: &Config) -> SynthesizerConfig {
    let mut synthesizer = config.synthesizer.clone();
    if let Some(query) = &args.query {
        synthesizer.query = query.clone();
    }
    if let Some(batch_size) = args.batch_size {
        synthesizer.batch_size = batch_size;
    }
    if let Some(token_limit) = args.token_limit {
        synthesizer.token_limit = token_limit;
    }
    if let Some(format) = args.format {
        synthesizer.program_format = format.into();
    }
    if args.max_batches.is_some() {
        synthesizer.max_batches = args.max_batches;
    }
    synthesizer
}

/// Where the run starts: a snapshot, the seed catalogue, or the beginning
fn initial_state(args: &RunArgs, synthesizer: &SynthesizerConfig) -> Result<Option<RunState>> {
    if let Some(path) = &args.resume {
        let state = load_state(path)?;
        info!(
            run_id = %state.run_id,
            batches = state.batches_completed,
            "Resuming from {}",
            path.display()
        );
        return Ok(Some(state));
    }

    if args.seed_catalogue {
        if synthesizer.program_format != ProgramFormat::Rules {
            return Err(CliError::InvalidInput(
                "--seed-catalogue needs the rules program format".to_string(),
            ));
        }
        let catalogue = RuleSet::builtin_catalogue()?;
        info!(rules = catalogue.len(), "Seeding with the built-in catalogue");
        let program = ExtractionProgram::new(catalogue.to_json_pretty()?);
        return Ok(Some(RunState::with_program(program)));
    }

    Ok(None)
}

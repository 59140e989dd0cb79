//! The synthesis state machine
//!
//! ```text
//! Fetching ──(empty, no cursor)──────────────────────────────▶ Done
//!    │
//!    ▼
//! ProcessingDocument ──(last document or failure)──▶ Advancing ──(no cursor)──▶ Done
//!    ▲                                                   │
//!    └──────────── Fetching ◀────────(cursor)────────────┘
//! ```
//!
//! Each document is composed against the latest program, so documents are
//! handled strictly one after another.

use crate::config::SynthesizerConfig;
use crate::error::SynthesisError;
use crate::metrics::RunMetrics;
use crate::pager::DocumentPager;
use crate::parser::{Rejection, ResponseInterpreter};
use crate::prompt::PromptComposer;
use crate::slicer::TokenBudgetSlicer;
use crate::store::ExtractionProgramStore;
use std::fmt::{self, Display};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use wayfarer_domain::traits::{DocumentSource, Oracle, Tokenizer};
use wayfarer_domain::{Batch, Cursor, Document, RunId, RunState};

/// Where the orchestrator is in its loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Next step requests a batch at the current cursor
    Fetching,
    /// Next step sends the current document to the oracle
    ProcessingDocument,
    /// Next step moves the cursor past the current batch
    Advancing,
    /// Terminal; no further oracle calls
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Fetching => "fetching",
            Phase::ProcessingDocument => "processing",
            Phase::Advancing => "advancing",
            Phase::Done => "done",
        };
        f.write_str(name)
    }
}

/// What happened to one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// 1-based batch number within the run, counting resumed batches
    pub batch_number: u64,

    /// Documents in the batch
    pub documents: usize,

    /// Documents whose response was interpreted
    pub processed: usize,

    /// Documents never sent because an earlier one failed
    pub skipped: usize,

    /// Documents flagged as itineraries
    pub itineraries: usize,

    /// Accepted program replacements
    pub updates: usize,

    /// Error that ended the batch early
    pub failure: Option<String>,

    /// Cursor the run continues from
    pub next_cursor: Option<Cursor>,
}

/// Hook invoked after every batch
///
/// This is where the accumulated program is surfaced to the operator and
/// where run state can be persisted for resumption. An error stops the run.
pub trait BatchObserver {
    /// Called once the cursor has moved past a batch
    fn after_batch(&mut self, state: &RunState, report: &BatchReport) -> Result<(), SynthesisError>;
}

impl<F> BatchObserver for F
where
    F: FnMut(&RunState, &BatchReport) -> Result<(), SynthesisError>,
{
    fn after_batch(&mut self, state: &RunState, report: &BatchReport) -> Result<(), SynthesisError> {
        self(state, report)
    }
}

/// Drives batches of documents through the oracle, folding updates into the program
pub struct SynthesisOrchestrator<S, O, T> {
    pager: DocumentPager<S>,
    oracle: O,
    composer: PromptComposer<T>,
    interpreter: ResponseInterpreter,
    store: ExtractionProgramStore,
    observers: Vec<Box<dyn BatchObserver>>,
    config: SynthesizerConfig,
    run_id: RunId,
    cursor: Option<Cursor>,
    batches_completed: u64,
    phase: Phase,
    batch: Batch,
    position: usize,
    report: BatchReport,
    metrics: RunMetrics,
}

impl<S, O, T> SynthesisOrchestrator<S, O, T>
where
    S: DocumentSource,
    S::Error: Display,
    O: Oracle,
    O::Error: Display,
    T: Tokenizer,
    T::Error: Display,
{
    /// Create an orchestrator starting from the first page with an empty program
    pub fn new(source: S, oracle: O, tokenizer: T, config: SynthesizerConfig) -> Result<Self, SynthesisError> {
        config.validate().map_err(SynthesisError::Config)?;

        let pager = DocumentPager::new(source, config.query.clone(), config.batch_size)
            .with_retries(config.max_fetch_attempts, config.fetch_retry_delay());
        let slicer = TokenBudgetSlicer::new(tokenizer, config.hard_char_ceiling, config.shrink_step_chars);
        let composer = PromptComposer::new(slicer, config.token_limit, config.program_format)
            .with_language(config.program_language.clone());
        let interpreter = ResponseInterpreter::new(config.program_format);
        let state = RunState::new();

        Ok(Self {
            pager,
            oracle,
            composer,
            interpreter,
            store: ExtractionProgramStore::new(state.program),
            observers: Vec::new(),
            config,
            run_id: state.run_id,
            cursor: None,
            batches_completed: 0,
            phase: Phase::Fetching,
            batch: Batch::default(),
            position: 0,
            report: BatchReport::default(),
            metrics: RunMetrics::new(),
        })
    }

    /// Register a batch observer
    pub fn with_observer(mut self, observer: impl BatchObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Continue from a saved state
    ///
    /// A state whose cursor is gone after at least one batch belongs to a
    /// finished run, so the orchestrator goes straight to `Done`.
    pub fn resume(&mut self, state: RunState) {
        self.phase = if state.at_beginning() || state.cursor.is_some() {
            Phase::Fetching
        } else {
            Phase::Done
        };
        info!(
            "Resuming run {} after {} batches at cursor {:?}",
            state.run_id, state.batches_completed, state.cursor
        );
        self.run_id = state.run_id;
        self.cursor = state.cursor;
        self.batches_completed = state.batches_completed;
        self.store = ExtractionProgramStore::new(state.program);
        self.batch = Batch::default();
        self.position = 0;
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current program text
    pub fn program(&self) -> &str {
        self.store.read()
    }

    /// Snapshot of the resumable state
    pub fn state(&self) -> RunState {
        RunState {
            run_id: self.run_id,
            cursor: self.cursor.clone(),
            program: self.store.snapshot(),
            batches_completed: self.batches_completed,
        }
    }

    /// Counters so far
    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    /// The document source
    pub fn source(&self) -> &S {
        self.pager.source()
    }

    /// The oracle
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Run configuration
    pub fn config(&self) -> &SynthesizerConfig {
        &self.config
    }

    /// Perform one transition and return the new phase
    ///
    /// Only retrieval failures, stalled cursors and observer errors are
    /// returned; oracle and slicing failures end the current batch and are
    /// recorded instead.
    pub fn step(&mut self) -> Result<Phase, SynthesisError> {
        let started = Instant::now();
        let result = match self.phase {
            Phase::Fetching => self.fetch(),
            Phase::ProcessingDocument => {
                self.process_current();
                Ok(())
            }
            Phase::Advancing => self.advance(),
            Phase::Done => Ok(()),
        };
        self.metrics.elapsed += started.elapsed();
        self.metrics.fetch_retries = self.pager.retries();

        if let Err(e) = result {
            error!("Run {} stopped while {}: {}", self.run_id, self.phase, e);
            return Err(e);
        }
        Ok(self.phase)
    }

    /// Step until `Done`, returning the final state
    pub fn run(&mut self) -> Result<RunState, SynthesisError> {
        info!("Starting run {} for query {:?}", self.run_id, self.pager.query());
        while self.step()? != Phase::Done {}
        info!("Run {} finished\n{}", self.run_id, self.metrics.summary());
        Ok(self.state())
    }

    fn fetch(&mut self) -> Result<(), SynthesisError> {
        let batch = self.pager.next_batch(self.cursor.as_ref())?;

        if batch.is_exhausted() {
            info!("Source exhausted after {} batches", self.batches_completed);
            self.phase = Phase::Done;
            return Ok(());
        }

        self.report = BatchReport {
            batch_number: self.batches_completed + 1,
            documents: batch.documents.len(),
            next_cursor: batch.next_cursor.clone(),
            ..BatchReport::default()
        };
        info!(
            "Batch {}: {} documents",
            self.report.batch_number, self.report.documents
        );
        self.position = 0;
        self.phase = if batch.documents.is_empty() {
            Phase::Advancing
        } else {
            Phase::ProcessingDocument
        };
        self.batch = batch;
        Ok(())
    }

    fn process_current(&mut self) {
        let Some(document) = self.batch.documents.get(self.position) else {
            self.phase = Phase::Advancing;
            return;
        };

        match Self::process_document(
            &self.composer,
            &self.oracle,
            &self.interpreter,
            &mut self.store,
            &mut self.metrics,
            document,
        ) {
            Ok(outcome) => {
                self.report.processed += 1;
                if outcome.itinerary {
                    self.report.itineraries += 1;
                }
                if outcome.updated {
                    self.report.updates += 1;
                }
                self.position += 1;
                if self.position >= self.batch.documents.len() {
                    self.phase = Phase::Advancing;
                }
            }
            Err(e) => {
                let remaining = self.batch.documents.len() - self.position - 1;
                warn!(
                    "Document {} failed: {}; skipping {} remaining in batch {}",
                    document.id, e, remaining, self.report.batch_number
                );
                self.metrics.document_failures += 1;
                self.metrics.documents_skipped += remaining as u64;
                self.report.skipped = remaining;
                self.report.failure = Some(e.to_string());
                self.phase = Phase::Advancing;
            }
        }
    }

    /// Compose, ask, interpret and fold one document into the store
    fn process_document(
        composer: &PromptComposer<T>,
        oracle: &O,
        interpreter: &ResponseInterpreter,
        store: &mut ExtractionProgramStore,
        metrics: &mut RunMetrics,
        document: &Document,
    ) -> Result<DocumentOutcome, SynthesisError> {
        let query = composer
            .compose(store.read(), &document.body)
            .map_err(|e| SynthesisError::Tokenizer(e.to_string()))?;
        if query.truncated {
            metrics.truncated_prompts += 1;
        }
        debug!(
            "Document {} ({} chars): prompt of {} tokens to {}",
            document.id,
            document.body.len(),
            query.tokens,
            oracle.model_name()
        );

        let completion = oracle
            .complete(&query.instructions)
            .map_err(|e| SynthesisError::Oracle(e.to_string()))?;

        let interpretation = interpreter.interpret(&completion);
        match interpretation.rejection {
            Some(Rejection::Decode(_)) => metrics.decode_failures += 1,
            Some(Rejection::InvalidRules(_)) => metrics.rejected_programs += 1,
            None => {}
        }

        let decision = interpretation.decision;
        let itinerary = decision.was_itinerary == Some(true);
        let updated = store.apply(&decision);

        metrics.documents_processed += 1;
        if itinerary {
            metrics.itineraries_flagged += 1;
        }
        if updated {
            metrics.program_updates += 1;
        }
        info!(
            "Document {}: itinerary={:?}, program updated: {}",
            document.id, decision.was_itinerary, updated
        );

        Ok(DocumentOutcome { itinerary, updated })
    }

    fn advance(&mut self) -> Result<(), SynthesisError> {
        self.cursor = self.batch.next_cursor.take();
        self.batches_completed += 1;
        self.metrics.batches += 1;
        self.batch = Batch::default();
        self.position = 0;

        let state = self.state();
        let report = std::mem::take(&mut self.report);
        for observer in &mut self.observers {
            observer.after_batch(&state, &report)?;
        }

        self.phase = match (&self.cursor, self.config.max_batches) {
            (None, _) => Phase::Done,
            (Some(_), Some(limit)) if self.batches_completed >= limit => {
                info!("Stopping after {} batches; resume from cursor {:?}", limit, self.cursor);
                Phase::Done
            }
            (Some(_), _) => Phase::Fetching,
        };
        Ok(())
    }
}

struct DocumentOutcome {
    itinerary: bool,
    updated: bool,
}

//! Run state persistence between batches

use crate::error::SynthesisError;
use crate::orchestrator::{BatchObserver, BatchReport};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use wayfarer_domain::{Cursor, ExtractionProgram, RunId, RunState};

/// On-disk form of a [`RunState`]
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    run_id: String,
    cursor: Option<String>,
    program: String,
    batches_completed: u64,
}

impl From<&RunState> for SnapshotFile {
    fn from(state: &RunState) -> Self {
        Self {
            run_id: state.run_id.to_string(),
            cursor: state.cursor.as_ref().map(|c| c.as_str().to_string()),
            program: state.program.as_str().to_string(),
            batches_completed: state.batches_completed,
        }
    }
}

impl TryFrom<SnapshotFile> for RunState {
    type Error = SynthesisError;

    fn try_from(file: SnapshotFile) -> Result<Self, Self::Error> {
        Ok(RunState {
            run_id: RunId::from_string(&file.run_id).map_err(SynthesisError::Snapshot)?,
            cursor: file.cursor.map(Cursor::new),
            program: ExtractionProgram::new(file.program),
            batches_completed: file.batches_completed,
        })
    }
}

/// Write `state` as JSON, replacing `path` atomically
pub fn save_state(path: impl AsRef<Path>, state: &RunState) -> Result<(), SynthesisError> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(&SnapshotFile::from(state))?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    debug!("Saved run state to {}", path.display());
    Ok(())
}

/// Read a state written by [`save_state`]
pub fn load_state(path: impl AsRef<Path>) -> Result<RunState, SynthesisError> {
    let contents = fs::read_to_string(path.as_ref())?;
    let file: SnapshotFile = serde_json::from_str(&contents)?;
    RunState::try_from(file)
}

/// Saves the run state after every batch
#[derive(Debug, Clone)]
pub struct SnapshotObserver {
    path: PathBuf,
}

impl SnapshotObserver {
    /// Snapshot to `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot location
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BatchObserver for SnapshotObserver {
    fn after_batch(&mut self, state: &RunState, _report: &BatchReport) -> Result<(), SynthesisError> {
        save_state(&self.path, state)
    }
}

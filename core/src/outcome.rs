//! Step policies and the outcomes of multi-step operations
//!
//! Rename, delete and convert touch up to three resources (libvirt's domain
//! registry, the XML definition, the disk image) without any rollback. Each
//! step is tagged with a [`StepPolicy`]: a `HardStop` failure aborts the
//! operation, a `BestEffort` failure is recorded as a warning and the next
//! step runs.

use crate::error::StepFailure;
use crate::Result;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPolicy {
    HardStop,
    BestEffort,
}

/// Runs steps under their policy and keeps the best-effort failures
#[derive(Debug, Default)]
pub struct StepLog {
    warnings: Vec<StepFailure>,
}

impl StepLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one step. `Ok(None)` means a best-effort step failed and was recorded.
    pub fn run<T>(
        &mut self,
        step: &str,
        policy: StepPolicy,
        f: impl FnOnce() -> Result<T>,
    ) -> Result<Option<T>> {
        match (f(), policy) {
            (Ok(value), _) => Ok(Some(value)),
            (Err(e), StepPolicy::HardStop) => Err(e),
            (Err(e), StepPolicy::BestEffort) => {
                log::warn!("{} failed: {}", step, e);
                self.warnings.push(StepFailure::new(step, e));
                Ok(None)
            }
        }
    }

    /// Record a best-effort problem that did not come from a failed call
    pub fn warn(&mut self, step: &str, reason: impl ToString) {
        log::warn!("{}: {}", step, reason.to_string());
        self.warnings.push(StepFailure::new(step, reason));
    }

    pub fn into_warnings(self) -> Vec<StepFailure> {
        self.warnings
    }
}

/// A file moved from one path to another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Moved {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Outcome of a rename whose libvirt step succeeded
#[derive(Debug)]
pub struct RenameOutcome {
    pub old_name: String,
    pub new_name: String,
    pub xml: Option<Moved>,
    pub disk: Option<Moved>,
    pub warnings: Vec<StepFailure>,
}

impl RenameOutcome {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Outcome of an undefine whose disk cleanup had no failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Every resolved disk file was removed
    Removed(Vec<PathBuf>),
    NothingToDelete,
    /// The operator declined; the domain stays undefined
    DeletionSkipped { count: usize },
}

#[derive(Debug)]
pub struct ResizeOutcome {
    pub path: PathBuf,
    pub delta_gib: u64,
    pub output: String,
}

#[derive(Debug)]
pub struct ConvertOutcome {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub xml_updated: bool,
    pub warnings: Vec<StepFailure>,
}

#[derive(Debug)]
pub enum RepairOutcome {
    Intact { check_output: String },
    Repaired { check_output: String, repair_output: String },
}

//! Batch results: per-document outcomes and the running tally.

use crate::error::DocumentError;
use serde::Serialize;
use std::path::PathBuf;

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Moved to `target`. In dry-run mode the move was only planned.
    Renamed { target: PathBuf, dry_run: bool },
    /// Already carried its correct name; left untouched.
    AlreadyNamed,
    /// Processing stopped at the given error.
    Failed { error: DocumentError },
}

/// Result for a single document of the batch.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentOutcome {
    pub source: PathBuf,
    /// Name after normalisation and spelling fixes, when extraction got that far.
    pub name: Option<String>,
    pub status: DocumentStatus,
    pub duration_ms: u64,
}

impl DocumentOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self.status, DocumentStatus::Failed { .. })
    }

    pub fn error(&self) -> Option<&DocumentError> {
        match &self.status {
            DocumentStatus::Failed { error } => Some(error),
            _ => None,
        }
    }
}

/// Success / failure counts for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchTally {
    /// Renamed plus already-named documents.
    pub succeeded: usize,
    pub renamed: usize,
    pub already_named: usize,
    pub failed: usize,
}

impl BatchTally {
    pub fn record(&mut self, status: &DocumentStatus) {
        match status {
            DocumentStatus::Renamed { .. } => {
                self.succeeded += 1;
                self.renamed += 1;
            }
            DocumentStatus::AlreadyNamed => {
                self.succeeded += 1;
                self.already_named += 1;
            }
            DocumentStatus::Failed { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Terminal condition of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// The directory held no eligible documents.
    NoDocuments,
    /// At least one document was attempted, whatever the outcome.
    Completed,
}

impl BatchStatus {
    /// Process exit code for this condition.
    pub fn exit_code(self) -> i32 {
        match self {
            BatchStatus::NoDocuments => 1,
            BatchStatus::Completed => 0,
        }
    }
}

/// Full report of a [`crate::rename_directory`] run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub directory: PathBuf,
    pub documents: Vec<DocumentOutcome>,
    pub tally: BatchTally,
    pub duration_ms: u64,
}

impl BatchReport {
    pub fn status(&self) -> BatchStatus {
        if self.tally.total() == 0 {
            BatchStatus::NoDocuments
        } else {
            BatchStatus::Completed
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &DocumentOutcome> {
        self.documents.iter().filter(|d| !d.is_success())
    }
}

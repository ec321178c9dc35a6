use std::path::{Path, PathBuf};

use super::{read_document, write_document, StoreError};
use crate::models::{PatientRecord, RunStatus, StatusEntry};

/// The sparse run-status document.
#[derive(Debug, Clone)]
pub struct StatusLedger {
    path: PathBuf,
}

impl StatusLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries in stored order. A ledger file that does not exist yet
    /// is an empty ledger: every patient is implicitly `NOT_RUN`.
    pub fn load(&self) -> Result<Vec<StatusEntry>, StoreError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "Status ledger absent, treating as empty");
            return Ok(Vec::new());
        }
        read_document(&self.path)
    }

    /// Overwrite the whole document.
    pub fn save(&self, entries: &[StatusEntry]) -> Result<(), StoreError> {
        write_document(&self.path, entries)
    }
}

/// Status for `id`, or `NOT_RUN` when the ledger has no entry.
pub fn get_status(id: &str, entries: &[StatusEntry]) -> RunStatus {
    entries
        .iter()
        .find(|e| e.id == id)
        .map(|e| e.run_status)
        .unwrap_or_default()
}

/// Update the first entry for `id`, or append one.
pub fn set_status(id: &str, status: RunStatus, entries: &mut Vec<StatusEntry>) {
    match entries.iter_mut().find(|e| e.id == id) {
        Some(entry) => entry.run_status = status,
        None => entries.push(StatusEntry::new(id, status)),
    }
}

/// A fresh ledger with one `NOT_RUN` entry per record, in record order.
pub fn reset_entries(records: &[PatientRecord]) -> Vec<StatusEntry> {
    records
        .iter()
        .map(|r| StatusEntry::new(r.id.clone(), RunStatus::NotRun))
        .collect()
}

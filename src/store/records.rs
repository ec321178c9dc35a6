use std::path::{Path, PathBuf};

use super::{read_document, write_document, StoreError};
use crate::models::PatientRecord;

/// The patient record document.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records in stored order.
    pub fn load(&self) -> Result<Vec<PatientRecord>, StoreError> {
        read_document(&self.path)
    }

    /// Overwrite the whole document.
    pub fn save(&self, records: &[PatientRecord]) -> Result<(), StoreError> {
        write_document(&self.path, records)
    }
}

/// First record with `id`, in stored order.
pub fn find<'a>(records: &'a [PatientRecord], id: &str) -> Option<&'a PatientRecord> {
    records.iter().find(|r| r.id == id)
}

/// Mutable variant of [`find`].
pub fn find_mut<'a>(records: &'a mut [PatientRecord], id: &str) -> Option<&'a mut PatientRecord> {
    records.iter_mut().find(|r| r.id == id)
}

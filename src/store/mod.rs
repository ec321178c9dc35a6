//! JSON document stores.
//!
//! Both documents are top-level JSON arrays that are read in full and
//! rewritten in full. Writes go to a sibling temp file which is then
//! renamed over the target, so readers never observe a half-written file.

pub mod ledger;
pub mod records;

use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use ledger::StatusLedger;
pub use records::RecordStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON document {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Both backing documents, opened from one data directory.
#[derive(Debug, Clone)]
pub struct PanelStore {
    pub records: RecordStore,
    pub ledger: StatusLedger,
}

impl PanelStore {
    pub fn open(data_dir: &Path, records_file: &str, state_file: &str) -> Self {
        Self {
            records: RecordStore::new(data_dir.join(records_file)),
            ledger: StatusLedger::new(data_dir.join(state_file)),
        }
    }
}

/// Read a whole JSON array document.
pub(crate) fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let file = std::fs::File::open(path).map_err(|e| StoreError::io(path, e))?;
    let items: Vec<T> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| StoreError::json(path, e))?;
    tracing::debug!(path = %path.display(), count = items.len(), "Document loaded");
    Ok(items)
}

/// Replace a JSON array document atomically (temp file + rename).
pub(crate) fn write_document<T: Serialize>(path: &Path, items: &[T]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| StoreError::io(path, e))?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer_pretty(&mut writer, items).map_err(|e| StoreError::json(path, e))?;
        writer.flush().map_err(|e| StoreError::io(path, e))?;
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| StoreError::io(path, e))?;
    tmp.persist(path).map_err(|e| StoreError::io(path, e.error))?;

    tracing::debug!(path = %path.display(), count = items.len(), "Document saved");
    Ok(())
}

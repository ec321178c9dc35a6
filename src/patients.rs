//! Patient list, detail and edit operations.
//!
//! Every call reloads both documents from disk, works on the in-memory
//! copies and writes back only the documents it changed.

use serde::{Deserialize, Serialize};

use crate::models::{PatientRecord, RunStatus};
use crate::store::ledger::{get_status, reset_entries, set_status};
use crate::store::records::{find, find_mut};
use crate::store::{PanelStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("Patient {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Row of the patient table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientListItem {
    pub id: String,
    pub full_name: String,
    pub birth_date: String,
    pub gender: String,
    pub phone: String,
    pub email: String,
    pub demographic: String,
    pub run_status: RunStatus,
}

/// Detail view: the list row, the editable fields in their stored
/// snake_case names, and the untouched record for read-only display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientDetail {
    #[serde(flatten)]
    pub summary: PatientListItem,
    pub first_name: String,
    pub last_name: String,
    pub additional_context: String,
    pub current_medications: String,
    pub allergies: String,
    pub past_medical_history: String,
    #[serde(rename = "rawHeidi")]
    pub raw: PatientRecord,
}

/// PATCH body. Absent (or null) fields are left alone; unknown keys are
/// ignored. An empty string is a real value and is written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub additional_context: Option<String>,
    pub current_medications: Option<String>,
    pub allergies: Option<String>,
    pub past_medical_history: Option<String>,
    #[serde(rename = "runStatus")]
    pub run_status: Option<RunStatus>,
}

impl PatientUpdate {
    /// Write every present record field onto `record`.
    ///
    /// Returns `true` when at least one record field was present, i.e. the
    /// record document needs saving.
    pub fn apply_to(&self, record: &mut PatientRecord) -> bool {
        let mut touched = false;
        let fields = [
            (&self.first_name, &mut record.first_name),
            (&self.last_name, &mut record.last_name),
            (&self.phone, &mut record.phone),
            (&self.email, &mut record.email),
            (&self.additional_context, &mut record.additional_context),
            (&self.current_medications, &mut record.current_medications),
            (&self.allergies, &mut record.allergies),
            (&self.past_medical_history, &mut record.past_medical_history),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                slot.clone_from(value);
                touched = true;
            }
        }

        if self.first_name.is_some() || self.last_name.is_some() {
            record.refresh_demographic();
        }
        touched
    }
}

pub fn to_list_item(record: &PatientRecord, run_status: RunStatus) -> PatientListItem {
    PatientListItem {
        id: record.id.clone(),
        full_name: record.full_name(),
        birth_date: record.birth_date.clone(),
        gender: record.gender.clone(),
        phone: record.phone.clone(),
        email: record.email.clone(),
        demographic: record.demographic_string.clone(),
        run_status,
    }
}

pub fn to_detail(record: &PatientRecord, run_status: RunStatus) -> PatientDetail {
    PatientDetail {
        summary: to_list_item(record, run_status),
        first_name: record.first_name.clone(),
        last_name: record.last_name.clone(),
        additional_context: record.additional_context.clone(),
        current_medications: record.current_medications.clone(),
        allergies: record.allergies.clone(),
        past_medical_history: record.past_medical_history.clone(),
        raw: record.clone(),
    }
}

/// All patients in stored order with their current run status.
pub fn list_patients(store: &PanelStore) -> Result<Vec<PatientListItem>, PatientError> {
    let records = store.records.load()?;
    let ledger = store.ledger.load()?;

    Ok(records
        .iter()
        .map(|r| to_list_item(r, get_status(&r.id, &ledger)))
        .collect())
}

pub fn get_patient(store: &PanelStore, id: &str) -> Result<PatientDetail, PatientError> {
    let records = store.records.load()?;
    let ledger = store.ledger.load()?;

    let record = find(&records, id).ok_or_else(|| PatientError::NotFound(id.to_string()))?;
    Ok(to_detail(record, get_status(id, &ledger)))
}

/// Apply a partial update to one patient and return the refreshed detail.
///
/// The record document is written only if a record field was present, the
/// ledger only if `runStatus` was present. The two writes are independent.
pub fn update_patient(
    store: &PanelStore,
    id: &str,
    update: &PatientUpdate,
) -> Result<PatientDetail, PatientError> {
    let mut records = store.records.load()?;
    let mut ledger = store.ledger.load()?;

    let record =
        find_mut(&mut records, id).ok_or_else(|| PatientError::NotFound(id.to_string()))?;
    let record_touched = update.apply_to(record);
    let detail_source = record.clone();

    if record_touched {
        store.records.save(&records)?;
        tracing::info!(patient_id = id, "Patient record updated");
    }

    if let Some(status) = update.run_status {
        set_status(id, status, &mut ledger);
        store.ledger.save(&ledger)?;
        tracing::info!(patient_id = id, run_status = %status, "Run status updated");
    }

    Ok(to_detail(&detail_source, get_status(id, &ledger)))
}

/// Replace the ledger with a `NOT_RUN` entry for every known patient.
/// Returns the number of entries written.
pub fn reset_run_statuses(store: &PanelStore) -> Result<usize, PatientError> {
    let records = store.records.load()?;
    let ledger = reset_entries(&records);
    store.ledger.save(&ledger)?;

    tracing::info!(count = ledger.len(), "All run statuses reset");
    Ok(ledger.len())
}

use serde::{Deserialize, Serialize};

use super::enums::RunStatus;

/// One row of the status ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub id: String,
    #[serde(rename = "runStatus")]
    pub run_status: RunStatus,
}

impl StatusEntry {
    pub fn new(id: impl Into<String>, run_status: RunStatus) -> Self {
        Self {
            id: id.into(),
            run_status,
        }
    }
}

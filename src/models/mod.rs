pub mod enums;
pub mod patient;
pub mod status;

pub use enums::RunStatus;
pub use patient::PatientRecord;
pub use status::StatusEntry;

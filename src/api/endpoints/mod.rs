//! API endpoint handlers.
//!
//! Handlers are thin: they move the blocking document work onto the
//! blocking pool and map errors. The logic lives in `crate::patients`.

pub mod health;
pub mod patients;

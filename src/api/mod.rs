//! HTTP API for the patient panel.
//!
//! Routes live at the root (`/` health check) and under `/api/patients`.
//! The router is wrapped in a CORS layer for the front-end dev origins and
//! an access-log middleware.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::patient_api_router;
pub use server::{serve, start_server_on, PanelServer};
pub use types::ApiContext;

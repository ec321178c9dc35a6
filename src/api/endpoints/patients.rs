//! Patient endpoints.
//!
//! - `GET /api/patients` — list
//! - `GET /api/patients/:id` — detail
//! - `PATCH /api/patients/:id` — partial update of fields and/or run status
//! - `POST /api/patients/reset-run-status` — set every patient to `NOT_RUN`

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::patients::{self, PatientDetail, PatientListItem, PatientUpdate};

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub message: &'static str,
    pub count: usize,
}

/// `GET /api/patients` — every patient with its run status, in stored order.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<PatientListItem>>, ApiError> {
    let store = ctx.store.clone();
    let items = tokio::task::spawn_blocking(move || patients::list_patients(&store)).await??;
    Ok(Json(items))
}

/// `GET /api/patients/:id` — full detail including the raw record.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<PatientDetail>, ApiError> {
    let store = ctx.store.clone();
    let detail =
        tokio::task::spawn_blocking(move || patients::get_patient(&store, &patient_id)).await??;
    Ok(Json(detail))
}

/// `PATCH /api/patients/:id` — apply the present fields, return the new detail.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
    payload: Result<Json<PatientUpdate>, JsonRejection>,
) -> Result<Json<PatientDetail>, ApiError> {
    let Json(update) = payload?;

    let _guard = ctx.write_lock.lock().await;
    let store = ctx.store.clone();
    let detail = tokio::task::spawn_blocking(move || {
        patients::update_patient(&store, &patient_id, &update)
    })
    .await??;
    Ok(Json(detail))
}

/// `POST /api/patients/reset-run-status` — rebuild the ledger from the records.
pub async fn reset_run_status(
    State(ctx): State<ApiContext>,
) -> Result<Json<ResetResponse>, ApiError> {
    let _guard = ctx.write_lock.lock().await;
    let store = ctx.store.clone();
    let count = tokio::task::spawn_blocking(move || patients::reset_run_statuses(&store)).await??;

    Ok(Json(ResetResponse {
        message: "All run statuses reset to NOT_RUN",
        count,
    }))
}

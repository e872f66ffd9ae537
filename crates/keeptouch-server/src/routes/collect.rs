//! Collect-lead function: `POST /functions/v1/collect-lead`
//!
//! The endpoint `/api/lead` forwards to. Validates the email, stores one
//! `leads` row with blank optional fields as NULL, and reports the new id.
//! Guarded by the service-key middleware.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use uuid::Uuid;

use keeptouch_core::error::LeadError;
use keeptouch_core::lead::{LeadRequest, NewLead};

use crate::error::AppError;
use crate::state::AppState;

/// Response body for a stored lead.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectResponse {
    pub success: bool,
    pub message: String,
    pub lead_id: Uuid,
}

/// Build the collect-lead router. Methods other than POST answer 405.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/functions/v1/collect-lead",
        post(collect_lead).fallback(method_not_allowed),
    )
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

async fn collect_lead(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LeadRequest>,
) -> Result<Json<CollectResponse>, AppError> {
    let lead = NewLead::from_request(req)?;

    let lead_id = state.leads.insert_lead(lead).await.map_err(|e| {
        if let LeadError::Repository { reason } = &e {
            tracing::error!(reason = %reason, "failed to insert lead");
        }
        AppError::Internal("Failed to save lead".to_owned())
    })?;

    tracing::info!(%lead_id, "lead collected");
    Ok(Json(CollectResponse {
        success: true,
        message: "Lead collected successfully".to_owned(),
        lead_id,
    }))
}

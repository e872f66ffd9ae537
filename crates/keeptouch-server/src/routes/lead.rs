//! Lead route: `POST /api/lead`
//!
//! Forwards the widget's lead to the collect-lead function and always
//! answers `{ success, message }`.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};

use keeptouch_core::lead::{LeadReceipt, LeadRequest};

use crate::state::AppState;

pub const INVALID_REQUEST_MESSAGE: &str = "Invalid lead request";

/// Build the lead router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/lead", post(submit_lead))
}

async fn submit_lead(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LeadRequest>, JsonRejection>,
) -> Json<LeadReceipt> {
    let Json(req) = match body {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(error = %e, "unreadable lead request");
            return Json(LeadReceipt::failed(INVALID_REQUEST_MESSAGE));
        }
    };
    let receipt = state.lead_function.forward(&req).await;
    if receipt.success {
        tracing::info!("lead forwarded");
    }
    Json(receipt)
}

//! Feedback route: `POST /api/feedback`

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use keeptouch_core::lead::{FeedbackRequest, LeadReceipt, NewFeedback};

use crate::error::AppError;
use crate::state::AppState;

/// Build the feedback router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/feedback", post(submit_feedback))
}

async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<LeadReceipt>, AppError> {
    let feedback = NewFeedback::from_request(req)?;
    state.leads.insert_feedback(feedback).await?;
    Ok(Json(LeadReceipt::ok("Thank you for your feedback!")))
}

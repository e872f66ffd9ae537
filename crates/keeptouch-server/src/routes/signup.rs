//! Beta signup route: `POST /api/signup`

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use keeptouch_core::lead::{LeadReceipt, SignupRequest, signup_email};

use crate::error::AppError;
use crate::state::AppState;

/// Build the signup router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/signup", post(signup))
}

async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<LeadReceipt>, AppError> {
    let email = signup_email(req)?;
    state.leads.insert_signup(&email).await?;
    Ok(Json(LeadReceipt::ok("Thanks for joining the beta!")))
}

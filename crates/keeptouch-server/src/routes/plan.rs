//! Plan route: `POST /api/plan`
//!
//! Fills the coaching prompt with `{name, block}` and returns the trimmed
//! generated text. Any failure, including a missing provider credential or
//! an unreadable body, answers `500 {"error": "Unable to generate plan"}`.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};

use keeptouch_core::plan::{PlanRequest, PlanResponse, generate_plan};

use crate::error::AppError;
use crate::state::AppState;

pub const PLAN_ERROR: &str = "Unable to generate plan";

/// Build the plan router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/plan", post(create_plan))
}

async fn create_plan(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Json<PlanResponse>, AppError> {
    let Json(req) = body.map_err(|e| {
        tracing::warn!(error = %e, "unreadable plan request");
        AppError::Internal(PLAN_ERROR.to_owned())
    })?;

    let Some(generator) = state.generator.as_deref() else {
        tracing::error!("plan requested but no text generator is configured");
        return Err(AppError::Internal(PLAN_ERROR.to_owned()));
    };

    match generate_plan(generator, &req.name, &req.block).await {
        Ok(plan) => Ok(Json(PlanResponse { plan })),
        Err(e) => {
            tracing::error!(error = %e, "plan generation failed");
            Err(AppError::Internal(PLAN_ERROR.to_owned()))
        }
    }
}

//! Service-key middleware for the collect-lead function route.
//!
//! When a service key is configured, requests must carry
//! `Authorization: Bearer <key>`. Without a configured key the route is open,
//! matching a local development setup.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::AppError;
use crate::state::AppState;

/// Reject requests whose bearer token does not match the service key.
pub async fn service_key_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.service_key.as_deref() else {
        return next.run(req).await;
    };

    let provided = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match provided {
        Some(token) if token == expected => next.run(req).await,
        Some(_) => AppError::Unauthorized("Invalid service key".to_owned()).into_response(),
        None => AppError::Unauthorized("Missing authorization header".to_owned()).into_response(),
    }
}

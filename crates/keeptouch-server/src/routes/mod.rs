//! HTTP route handlers for `KeepTouch`.
//!
//! Routes are organized by concern:
//! - `plan`: generated reconnection plans
//! - `lead`: lead forwarding for the reconnect widget
//! - `collect`: the collect-lead function that stores leads
//! - `signup`, `feedback`: landing page forms
//! - `health`: liveness probe
//! - `ui`: landing, terms and privacy pages

pub mod collect;
pub mod feedback;
pub mod health;
pub mod lead;
pub mod plan;
pub mod signup;
pub mod ui;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::middleware as axum_mw;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::service_key_middleware;
use crate::state::AppState;

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let collect_routes = collect::router().route_layer(axum_mw::from_fn_with_state(
        Arc::clone(&state),
        service_key_middleware,
    ));

    // API responses are never cached; the pages may be.
    let api_routes = Router::new()
        .merge(plan::router())
        .merge(lead::router())
        .merge(signup::router())
        .merge(feedback::router())
        .merge(health::router())
        .merge(collect_routes)
        .layer(tower::limit::ConcurrencyLimitLayer::new(64))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .merge(api_routes)
        .merge(ui::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .with_state(state)
}

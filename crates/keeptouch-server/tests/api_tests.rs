//! Integration tests for the `KeepTouch` HTTP API.
//!
//! Requests are driven through the full router in-process with
//! `tower::ServiceExt::oneshot`. The lead forwarding test also binds a real
//! listener on a free local port so `/api/lead` can reach the collect-lead
//! function over HTTP.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt;

use keeptouch_core::error::GenerateError;
use keeptouch_core::lead::MemoryLeadRepository;
use keeptouch_core::plan::{PlanPrompt, TextGenerator};
use keeptouch_server::config::LeadFunctionConfig;
use keeptouch_server::providers::lead_function::LeadFunctionClient;
use keeptouch_server::routes::build_router;
use keeptouch_server::state::AppState;

/// Generator answering with a fixed reply.
struct FixedGenerator(Result<&'static str, &'static str>);

#[async_trait::async_trait]
impl TextGenerator for FixedGenerator {
    async fn generate(&self, prompt: &PlanPrompt) -> Result<String, GenerateError> {
        assert!(prompt.system.contains("KeepTouch"));
        self.0
            .map(str::to_owned)
            .map_err(|reason| GenerateError::Provider {
                reason: reason.to_owned(),
            })
    }
}

struct TestApp {
    repo: MemoryLeadRepository,
    state: Arc<AppState>,
}

impl TestApp {
    fn new() -> Self {
        Self::with(None, LeadFunctionConfig::default())
    }

    fn with(generator: Option<FixedGenerator>, lead_function: LeadFunctionConfig) -> Self {
        let repo = MemoryLeadRepository::new();
        let state = Arc::new(AppState {
            generator: generator.map(|g| Arc::new(g) as Arc<dyn TextGenerator>),
            service_key: lead_function.service_key.clone(),
            lead_function: LeadFunctionClient::new(reqwest::Client::new(), lead_function),
            leads: Arc::new(repo.clone()),
        });
        Self { repo, state }
    }

    fn router(&self) -> Router {
        build_router(Arc::clone(&self.state))
    }

    async fn call(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.call(json_request(uri, &body, None)).await
    }
}

fn json_request(uri: &str, body: &Value, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

// ── Plan ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn plan_returns_trimmed_text() {
    let app = TestApp::with(
        Some(FixedGenerator(Ok("  1. Call them.\n"))),
        LeadFunctionConfig::default(),
    );
    let (status, body) = app
        .post("/api/plan", json!({"name": "Grandma", "block": "No free time"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"plan": "1. Call them."}));
}

#[tokio::test]
async fn plan_accepts_missing_fields() {
    let app = TestApp::with(Some(FixedGenerator(Ok("ok"))), LeadFunctionConfig::default());
    let (status, _) = app.post("/api/plan", json!({})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn plan_without_credentials_is_500() {
    let app = TestApp::new();
    let (status, body) = app.post("/api/plan", json!({"name": "a", "block": "b"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Unable to generate plan");
}

#[tokio::test]
async fn plan_provider_failure_is_500() {
    let app = TestApp::with(
        Some(FixedGenerator(Err("rate limited"))),
        LeadFunctionConfig::default(),
    );
    let (status, body) = app.post("/api/plan", json!({"name": "a", "block": "b"})).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Unable to generate plan");
    assert!(!body.to_string().contains("rate limited"));
}

#[tokio::test]
async fn plan_with_unreadable_body_is_500() {
    let app = TestApp::with(Some(FixedGenerator(Ok("ok"))), LeadFunctionConfig::default());
    let req = Request::post("/api/plan")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.call(req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Unable to generate plan");
}

// ── Collect-lead function ────────────────────────────────────────────

#[tokio::test]
async fn collect_requires_email() {
    let app = TestApp::new();
    let (status, body) = app
        .post("/functions/v1/collect-lead", json!({"email": "", "person": "Sam"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email is required");
    assert!(app.repo.leads().await.is_empty());
}

#[tokio::test]
async fn collect_stores_blank_fields_as_null() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/functions/v1/collect-lead",
            json!({"email": "a@b.com", "person": "", "block": "No time", "plan": null}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Lead collected successfully");

    let leads = app.repo.leads().await;
    assert_eq!(leads.len(), 1);
    assert_eq!(body["leadId"], leads[0].id.to_string());
    assert_eq!(leads[0].person, None);
    assert_eq!(leads[0].block.as_deref(), Some("No time"));
    assert_eq!(leads[0].plan, None);
}

#[tokio::test]
async fn collect_rejects_other_methods() {
    let app = TestApp::new();
    let req = Request::get("/functions/v1/collect-lead")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.call(req).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method not allowed");
}

#[tokio::test]
async fn collect_checks_service_key_when_configured() {
    let app = TestApp::with(
        None,
        LeadFunctionConfig {
            base_url: None,
            service_key: Some("svc-key".to_owned()),
        },
    );
    let lead = json!({"email": "a@b.com"});

    let (status, _) = app
        .call(json_request("/functions/v1/collect-lead", &lead, None))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call(json_request("/functions/v1/collect-lead", &lead, Some("wrong")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call(json_request("/functions/v1/collect-lead", &lead, Some("svc-key")))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.repo.leads().await.len(), 1);
}

// ── Lead forwarding ──────────────────────────────────────────────────

#[tokio::test]
async fn lead_without_function_url_reports_configuration_error() {
    let app = TestApp::new();
    let (status, body) = app.post("/api/lead", json!({"email": "a@b.com"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": false, "message": "Missing Supabase URL configuration"})
    );
}

#[tokio::test]
async fn lead_with_unreadable_body_answers_receipt() {
    let app = TestApp::new();
    let req = Request::post("/api/lead")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.call(req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": false, "message": "Invalid lead request"})
    );
}

/// Serve the app on a free port and point its lead forwarder at itself.
async fn self_forwarding_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = TestApp::with(
        None,
        LeadFunctionConfig {
            base_url: Some(format!("http://{addr}")),
            service_key: Some("svc-key".to_owned()),
        },
    );
    let served = app.router();
    tokio::spawn(async move {
        axum::serve(listener, served).await.unwrap();
    });
    app
}

#[tokio::test]
async fn lead_is_forwarded_to_collect_function() {
    let app = self_forwarding_app().await;
    let (status, body) = app
        .post(
            "/api/lead",
            json!({"email": "a@b.com", "person": "John Doe", "block": "No time", "plan": "X"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "message": "Lead submitted successfully!"})
    );
    let leads = app.repo.leads().await;
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].email, "a@b.com");
    assert_eq!(leads[0].person.as_deref(), Some("John Doe"));
}

#[tokio::test]
async fn lead_rejection_carries_upstream_error() {
    let app = self_forwarding_app().await;
    let (_, body) = app.post("/api/lead", json!({"email": "  "})).await;
    assert_eq!(
        body,
        json!({"success": false, "message": "Email is required"})
    );
    assert!(app.repo.leads().await.is_empty());
}

// ── Signup & feedback ────────────────────────────────────────────────

#[tokio::test]
async fn signup_stores_email() {
    let app = TestApp::new();
    let (status, body) = app.post("/api/signup", json!({"email": " beta@b.com "})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(app.repo.signups().await[0].email, "beta@b.com");
}

#[tokio::test]
async fn signup_requires_email() {
    let app = TestApp::new();
    let (status, body) = app.post("/api/signup", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email is required");
}

#[tokio::test]
async fn feedback_is_stored_with_optional_email() {
    let app = TestApp::new();
    let (status, _) = app
        .post("/api/feedback", json!({"feedback": "Finding the time", "email": ""}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let rows = app.repo.feedback().await;
    assert_eq!(rows[0].feedback, "Finding the time");
    assert_eq!(rows[0].email, None);

    let (status, _) = app.post("/api/feedback", json!({"feedback": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Runtime ──────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_ok_with_security_headers() {
    let app = TestApp::new();
    let resp = app
        .router()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(resp.headers()[header::X_FRAME_OPTIONS], "DENY");
    assert_eq!(resp.headers()[header::CACHE_CONTROL], "no-store");
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(serde_json::from_slice::<Value>(&bytes).unwrap(), json!({"status": "ok"}));
}

#[tokio::test]
async fn pages_are_served_as_html() {
    let app = TestApp::new();
    for path in ["/", "/terms", "/privacy"] {
        let resp = app
            .router()
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
        let content_type = resp.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/html"), "{path}: {content_type}");
        assert!(resp.headers().get(header::CACHE_CONTROL).is_none());
    }
}

//! HTTP client for the `KeepTouch` server.
//!
//! Implements the widget's [`PlanSource`] and [`LeadSink`] over
//! `/api/plan` and `/api/lead`, and exposes plain helpers for the other
//! commands.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::Value;

use keeptouch_core::error::ClientError;
use keeptouch_core::lead::{LeadReceipt, LeadRequest};
use keeptouch_core::plan::{PlanRequest, PlanResponse};
use keeptouch_core::widget::{LeadSink, PlanSource};

/// Error body returned by the server.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    addr: String,
}

impl ApiClient {
    pub fn new(addr: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            addr: addr.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.addr)
    }

    async fn send<B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ClientError> {
        self.http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Network {
                reason: e.to_string(),
            })
    }

    /// POST `body` and decode a successful JSON answer.
    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: serde::Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let resp = self.send(path, body).await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| status.to_string());
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }
        resp.json().await.map_err(|e| ClientError::Decode {
            reason: e.to_string(),
        })
    }

    /// POST a form body and fail on anything but a successful answer.
    pub async fn post_form(&self, path: &str, body: &Value) -> Result<LeadReceipt> {
        let receipt: LeadReceipt = self
            .post_json(path, body)
            .await
            .with_context(|| format!("request to {path} failed"))?;
        if !receipt.success {
            bail!("{}", receipt.message);
        }
        Ok(receipt)
    }
}

#[async_trait::async_trait]
impl PlanSource for ApiClient {
    async fn fetch_plan(&self, name: &str, blocker: &str) -> Result<String, ClientError> {
        let req = PlanRequest {
            name: name.to_owned(),
            block: blocker.to_owned(),
        };
        let resp: PlanResponse = self.post_json("/api/plan", &req).await?;
        Ok(resp.plan)
    }
}

#[async_trait::async_trait]
impl LeadSink for ApiClient {
    async fn submit_lead(&self, lead: &LeadRequest) -> Result<LeadReceipt, ClientError> {
        self.post_json("/api/lead", lead).await
    }
}

//! Client for the collect-lead function.
//!
//! Backs `POST /api/lead`. Every outcome, including missing configuration
//! and transport failures, is folded into a [`LeadReceipt`] so the caller
//! always gets `{ success, message }` back.

use serde::Deserialize;

use keeptouch_core::error::ClientError;
use keeptouch_core::lead::{LeadReceipt, LeadRequest};
use keeptouch_core::widget::LeadSink;

use crate::config::LeadFunctionConfig;

/// Path of the collect-lead function under its base URL.
pub const COLLECT_LEAD_PATH: &str = "/functions/v1/collect-lead";

pub const SUBMITTED_MESSAGE: &str = "Lead submitted successfully!";

pub const MISSING_URL_MESSAGE: &str = "Missing Supabase URL configuration";

/// Error body the function answers with on failure.
#[derive(Debug, Deserialize)]
struct FunctionError {
    error: Option<String>,
}

/// Forwards leads with the service-role bearer credential.
#[derive(Clone)]
pub struct LeadFunctionClient {
    http: reqwest::Client,
    config: LeadFunctionConfig,
}

impl std::fmt::Debug for LeadFunctionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeadFunctionClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LeadFunctionClient {
    #[must_use]
    pub fn new(http: reqwest::Client, config: LeadFunctionConfig) -> Self {
        Self { http, config }
    }

    /// Forward `lead` and describe the outcome.
    pub async fn forward(&self, lead: &LeadRequest) -> LeadReceipt {
        let Some(base_url) = &self.config.base_url else {
            tracing::error!("lead forwarding is not configured");
            return LeadReceipt::failed(MISSING_URL_MESSAGE);
        };

        let mut req = self
            .http
            .post(format!("{base_url}{COLLECT_LEAD_PATH}"))
            .json(lead);
        if let Some(key) = &self.config.service_key {
            req = req.bearer_auth(key);
        }

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = %e, "failed to reach collect-lead function");
                return LeadReceipt::failed(format!("Request failed: {e}"));
            }
        };

        let status = resp.status();
        if status.is_success() {
            return LeadReceipt::ok(SUBMITTED_MESSAGE);
        }

        let upstream = resp
            .json::<FunctionError>()
            .await
            .ok()
            .and_then(|body| body.error);
        tracing::warn!(%status, error = ?upstream, "collect-lead function rejected lead");
        LeadReceipt::failed(
            upstream.unwrap_or_else(|| format!("Server responded with {}", status.as_u16())),
        )
    }
}

#[async_trait::async_trait]
impl LeadSink for LeadFunctionClient {
    async fn submit_lead(&self, lead: &LeadRequest) -> Result<LeadReceipt, ClientError> {
        Ok(self.forward(lead).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_base_url_fails_without_network() {
        let client = LeadFunctionClient::new(reqwest::Client::new(), LeadFunctionConfig::default());
        let receipt = client
            .forward(&LeadRequest {
                email: "a@b.com".to_owned(),
                ..LeadRequest::default()
            })
            .await;
        assert_eq!(receipt, LeadReceipt::failed(MISSING_URL_MESSAGE));
    }
}

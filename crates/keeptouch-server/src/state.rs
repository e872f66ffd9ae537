//! Shared application state for the `KeepTouch` server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`.

use std::sync::Arc;

use keeptouch_core::lead::LeadRepository;
use keeptouch_core::plan::TextGenerator;

use crate::providers::lead_function::LeadFunctionClient;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Plan text generator. `None` when no provider credential is configured.
    pub generator: Option<Arc<dyn TextGenerator>>,
    /// Forwards `/api/lead` submissions to the collect-lead function.
    pub lead_function: LeadFunctionClient,
    /// Storage for leads, beta signups and feedback.
    pub leads: Arc<dyn LeadRepository>,
    /// Bearer credential the collect-lead route requires, if any.
    pub service_key: Option<String>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("generator", &self.generator.is_some())
            .field("lead_function", &self.lead_function)
            .finish_non_exhaustive()
    }
}

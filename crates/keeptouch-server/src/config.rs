//! Server configuration for `KeepTouch`.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Missing provider credentials never abort startup; the routes that need
//! them answer with an error at request time instead.

use std::net::SocketAddr;

use keeptouch_core::plan::GenerationParams;

/// Default OpenAI-compatible API base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Where leads, signups and feedback are stored.
    pub database: DatabaseBackendType,
    /// Text generation provider. `None` when `OPENAI_KEY` is unset.
    pub openai: Option<OpenAiConfig>,
    /// Lead-collection function settings.
    pub lead_function: LeadFunctionConfig,
}

/// Supported lead database backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseBackendType {
    /// In-memory (development only, data lost on restart).
    Memory,
    /// `PostgreSQL` via sqlx.
    Postgres { url: String },
}

/// Settings for the OpenAI-compatible chat completions provider.
#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    /// Base URL without the `/v1/...` suffix.
    pub base_url: String,
    pub params: GenerationParams,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"[redacted]")
            .field("base_url", &self.base_url)
            .field("params", &self.params)
            .finish()
    }
}

/// Settings for forwarding leads to the collect-lead function.
#[derive(Clone, Default)]
pub struct LeadFunctionConfig {
    /// Base URL the function lives under. `/api/lead` fails without it.
    pub base_url: Option<String>,
    /// Service-role bearer credential. When set, the collect route also
    /// requires it from callers.
    pub service_key: Option<String>,
}

impl std::fmt::Debug for LeadFunctionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeadFunctionConfig")
            .field("base_url", &self.base_url)
            .field("service_key", &self.service_key.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT`: port to bind on (binds to `0.0.0.0`)
    /// - `KEEPTOUCH_BIND_ADDR`: full bind address (overrides `PORT`, default: `127.0.0.1:3000`)
    /// - `KEEPTOUCH_LOG_LEVEL`: log filter (default: `info`)
    /// - `KEEPTOUCH_DATABASE`: `memory` or `postgres` (default: `memory`)
    /// - `DATABASE_URL`: `PostgreSQL` connection string (used when `KEEPTOUCH_DATABASE=postgres`)
    /// - `OPENAI_KEY`: generation credential (optional)
    /// - `OPENAI_BASE_URL`: provider base URL (default: `https://api.openai.com`)
    /// - `OPENAI_MODEL`: model name (default: `gpt-4.1-nano`)
    /// - `SUPABASE_URL`: base URL of the collect-lead function (optional)
    /// - `SUPABASE_SERVICE_KEY`: bearer credential for the collect-lead function (optional)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let fallback = SocketAddr::from(([127, 0, 0, 1], 3000));
        let bind_addr = if let Some(addr) = var("KEEPTOUCH_BIND_ADDR") {
            addr.parse().unwrap_or(fallback)
        } else if let Some(port) = var("PORT") {
            SocketAddr::from(([0, 0, 0, 0], port.parse().unwrap_or(3000)))
        } else {
            fallback
        };

        let log_level = var("KEEPTOUCH_LOG_LEVEL").unwrap_or_else(|| "info".to_owned());

        let database = match var("KEEPTOUCH_DATABASE")
            .unwrap_or_else(|| "memory".to_owned())
            .to_lowercase()
            .as_str()
        {
            "postgres" | "postgresql" => DatabaseBackendType::Postgres {
                url: var("DATABASE_URL")
                    .unwrap_or_else(|| "postgres://localhost/keeptouch".to_owned()),
            },
            _ => DatabaseBackendType::Memory,
        };

        let openai = var("OPENAI_KEY")
            .filter(|k| !k.trim().is_empty())
            .map(|api_key| {
                let mut params = GenerationParams::default();
                if let Some(model) = var("OPENAI_MODEL") {
                    params.model = model;
                }
                OpenAiConfig {
                    api_key,
                    base_url: var("OPENAI_BASE_URL")
                        .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_owned())
                        .trim_end_matches('/')
                        .to_owned(),
                    params,
                }
            });

        let lead_function = LeadFunctionConfig {
            base_url: var("SUPABASE_URL")
                .filter(|u| !u.trim().is_empty())
                .map(|u| u.trim_end_matches('/').to_owned()),
            service_key: var("SUPABASE_SERVICE_KEY").filter(|k| !k.is_empty()),
        };

        Self {
            bind_addr,
            log_level,
            database,
            openai,
            lead_function,
        }
    }
}

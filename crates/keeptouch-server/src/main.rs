//! `KeepTouch` server entry point.
//!
//! Builds the lead repository and outbound providers from the environment,
//! then starts the Axum HTTP server with graceful shutdown.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use keeptouch_core::lead::{LeadRepository, MemoryLeadRepository};
use keeptouch_core::plan::TextGenerator;

use keeptouch_server::config::{DatabaseBackendType, ServerConfig};
use keeptouch_server::providers::lead_function::LeadFunctionClient;
use keeptouch_server::providers::openai::OpenAiGenerator;
use keeptouch_server::routes;
use keeptouch_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(database = ?config.database, "KeepTouch starting");

    let state = build_app_state(&config).await?;
    let app = routes::build_router(state);

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "KeepTouch server listening");

    tokio::spawn(shutdown_signal(shutdown_tx));

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await
        .context("server error")?;

    info!("KeepTouch server stopped");
    Ok(())
}

/// Build the shared application state.
async fn build_app_state(config: &ServerConfig) -> anyhow::Result<Arc<AppState>> {
    let leads: Arc<dyn LeadRepository> = match &config.database {
        DatabaseBackendType::Memory => {
            info!("using in-memory lead storage (data will not persist)");
            Arc::new(MemoryLeadRepository::new())
        }
        #[cfg(feature = "postgres")]
        DatabaseBackendType::Postgres { url } => {
            info!(url = %"[redacted]", "using PostgreSQL lead storage");
            Arc::new(
                keeptouch_server::repository::PgLeadRepository::connect(url)
                    .await
                    .context("failed to connect to PostgreSQL")?,
            )
        }
        #[cfg(not(feature = "postgres"))]
        DatabaseBackendType::Postgres { .. } => {
            anyhow::bail!("PostgreSQL requested but feature 'postgres' is not enabled");
        }
    };

    let http = reqwest::Client::new();

    let generator: Option<Arc<dyn TextGenerator>> = match &config.openai {
        Some(openai) => {
            info!(model = %openai.params.model, "plan generation enabled");
            Some(Arc::new(OpenAiGenerator::new(http.clone(), openai.clone())))
        }
        None => {
            warn!("OPENAI_KEY is not set, /api/plan will answer with an error");
            None
        }
    };

    if config.lead_function.base_url.is_none() {
        warn!("SUPABASE_URL is not set, /api/lead will report a configuration error");
    }

    Ok(Arc::new(AppState {
        generator,
        lead_function: LeadFunctionClient::new(http, config.lead_function.clone()),
        leads,
        service_key: config.lead_function.service_key.clone(),
    }))
}

/// Wait for SIGINT or SIGTERM, then broadcast shutdown.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
    let _ = shutdown_tx.send(true);
}

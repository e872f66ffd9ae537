//! `KeepTouch` CLI: the reconnect widget in a terminal.
//!
//! Hosts the reconnect widget against a running `keeptouch-server`, keeping
//! widget answers in a local redb file so a session can be resumed. Also
//! joins the beta, sends feedback, and previews generated plans.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod http;
mod session;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use keeptouch_core::persist::PersistedStore;
use keeptouch_core::widget::{PlanSource, ReconnectWidget, WIDGET_STATE_KEY, WidgetState};
use keeptouch_storage::RedbBackend;

use crate::http::ApiClient;

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

// ── CLI structure ────────────────────────────────────────────────────

/// KeepTouch: never lose touch with the people who matter.
#[derive(Parser)]
#[command(
    name = "keeptouch",
    version,
    about = "KeepTouch CLI: get a reconnection plan, join the beta, send feedback",
    long_about = None,
    after_help = format!(
        "{DIM}Environment variables:{RESET}\n  \
         KEEPTOUCH_SERVER       Server address (default: http://127.0.0.1:3000)\n  \
         KEEPTOUCH_STATE_FILE   Widget state file (default: .keeptouch/widget.redb)\n  \
         KEEPTOUCH_LOG          Log filter (default: warn)\n\n\
         {DIM}Examples:{RESET}\n  \
         keeptouch reconnect\n  \
         keeptouch plan --name Grandma --block \"No time\"\n  \
         keeptouch signup me@example.com"
    ),
)]
struct Cli {
    /// KeepTouch server address.
    #[arg(long, env = "KEEPTOUCH_SERVER", default_value = "http://127.0.0.1:3000")]
    server: String,

    /// File that keeps widget answers between sessions.
    #[arg(long, env = "KEEPTOUCH_STATE_FILE", default_value = ".keeptouch/widget.redb")]
    state_file: PathBuf,

    /// Keep widget answers in memory only.
    #[arg(long, default_value = "false")]
    no_persist: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk through name, blocker and plan, then unlock the plan by email.
    Reconnect,
    /// Generate a reconnection plan and print it.
    Plan {
        /// Person to reconnect with.
        #[arg(long, default_value = "")]
        name: String,
        /// What is getting in the way.
        #[arg(long, default_value = "")]
        block: String,
    },
    /// Join the beta.
    Signup {
        /// Email address.
        email: String,
    },
    /// Tell us the hardest part about staying in touch.
    Feedback {
        /// Your thoughts.
        text: String,
        /// Email address (optional).
        #[arg(long)]
        email: Option<String>,
    },
    /// Inspect or reset saved widget answers.
    State {
        #[command(subcommand)]
        action: StateCommands,
    },
}

#[derive(Subcommand)]
enum StateCommands {
    /// Show saved answers and where the widget resumes.
    Show,
    /// Forget saved answers.
    Clear,
}

// ── Output helpers ───────────────────────────────────────────────────

fn header(icon: &str, title: &str) {
    println!("{BOLD}{CYAN}{icon} {title}{RESET}");
    println!("{DIM}─────────────────────────────────────────{RESET}");
}

fn kv_line(key: &str, value: &str) {
    println!("  {DIM}{key:<16}{RESET} {WHITE}{value}{RESET}");
}

fn success(msg: &str) {
    println!("{GREEN}{BOLD}✓{RESET} {msg}");
}

fn warning(msg: &str) {
    println!("{YELLOW}{BOLD}⚠{RESET} {YELLOW}{msg}{RESET}");
}

// ── Command dispatch ─────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("KEEPTOUCH_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("  {RED}{BOLD}✗ Error:{RESET} {e:#}");
            eprintln!();
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let client = ApiClient::new(&cli.server);
    match cli.command {
        Commands::Reconnect => {
            let store = open_store(&cli.state_file, cli.no_persist).await;
            cmd_reconnect(client, store).await
        }
        Commands::Plan { name, block } => cmd_plan(&client, &name, &block).await,
        Commands::Signup { email } => cmd_signup(&client, &email).await,
        Commands::Feedback { text, email } => cmd_feedback(&client, &text, email).await,
        Commands::State { action } => {
            let store = open_store(&cli.state_file, cli.no_persist).await;
            cmd_state(&store, action).await
        }
    }
}

/// Open the state file, or fall back to memory-only when it cannot be used.
async fn open_store(path: &Path, no_persist: bool) -> PersistedStore {
    if no_persist {
        return PersistedStore::unavailable();
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            tracing::warn!(path = %parent.display(), error = %e, "cannot create state directory");
            return PersistedStore::unavailable();
        }
    }
    match RedbBackend::open(path) {
        Ok(backend) => PersistedStore::new(Arc::new(backend)),
        Err(e) => {
            tracing::warn!(error = %e, "widget state will not be saved");
            PersistedStore::unavailable()
        }
    }
}

async fn cmd_reconnect(client: ApiClient, store: PersistedStore) -> Result<()> {
    let client = Arc::new(client);
    let mut widget = ReconnectWidget::mount(store, client.clone(), client)
        .await
        .context("failed to start the reconnect widget")?;
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    session::run(&mut widget, stdin).await
}

async fn cmd_plan(client: &ApiClient, name: &str, block: &str) -> Result<()> {
    let plan = client
        .fetch_plan(name, block)
        .await
        .context("could not generate a plan")?;
    println!();
    header("📝", "Your personalized plan");
    for line in plan.lines() {
        println!("  {line}");
    }
    println!();
    Ok(())
}

async fn cmd_signup(client: &ApiClient, email: &str) -> Result<()> {
    let receipt = client
        .post_form("/api/signup", &json!({ "email": email }))
        .await?;
    success(&receipt.message);
    Ok(())
}

async fn cmd_feedback(client: &ApiClient, text: &str, email: Option<String>) -> Result<()> {
    let receipt = client
        .post_form("/api/feedback", &json!({ "feedback": text, "email": email }))
        .await?;
    success(&receipt.message);
    Ok(())
}

async fn cmd_state(store: &PersistedStore, action: StateCommands) -> Result<()> {
    if !store.is_available() {
        warning("Storage is unavailable; nothing is saved between sessions.");
    }
    match action {
        StateCommands::Show => {
            let state: WidgetState = store
                .try_load(WIDGET_STATE_KEY)
                .await
                .context("failed to read saved answers")?
                .unwrap_or_default();
            println!();
            header("💾", "Saved answers");
            kv_line("Resume step", state.resume_step().as_str());
            kv_line("Name", or_dash(&state.name));
            kv_line("Blocker", or_dash(&state.blocker));
            kv_line("Plan", or_dash(state.plan.lines().next().unwrap_or_default()));
            kv_line("Completed", &state.completed_steps.join(", "));
            println!();
        }
        StateCommands::Clear => {
            store.clear(WIDGET_STATE_KEY).await;
            success("Saved answers cleared.");
        }
    }
    Ok(())
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}

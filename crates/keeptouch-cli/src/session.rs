//! Interactive reconnect session.
//!
//! Drives a [`ReconnectWidget`] from line-based input. Each screen prints
//! its prompt, one line of input is read, and the matching widget action
//! runs. `b` goes back, `q` (or end of input) closes the widget.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use keeptouch_core::widget::{
    BLOCKERS, LeadOutcome, Notice, PlanView, ReconnectWidget, WidgetScreen, WidgetStep,
};

use crate::{BOLD, CYAN, DIM, GREEN, RED, RESET, header};

/// Run the widget until it closes or input ends.
pub async fn run<R: AsyncBufRead + Unpin>(widget: &mut ReconnectWidget, input: R) -> Result<()> {
    let mut lines = input.lines();
    widget.open();

    while widget.is_open() {
        render(widget)?;
        let Some(line) = lines.next_line().await? else {
            widget.close();
            break;
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            widget.close();
            break;
        }
        if line.eq_ignore_ascii_case("b") && widget.current_step() != WidgetStep::Name {
            widget.back();
            continue;
        }

        match widget.current_step() {
            WidgetStep::Name => {
                widget.submit_name(line).await;
            }
            WidgetStep::Blocker => {
                if let Some(blocker) = parse_blocker(line) {
                    println!("  {DIM}Creating your personalized plan...{RESET}");
                    widget.select_blocker(blocker).await;
                }
            }
            WidgetStep::Plan => match widget.submit_email(line).await {
                LeadOutcome::Submitted(ticket) => {
                    show_notice(widget);
                    tokio::time::sleep(ticket.delay()).await;
                    widget.finish_close(ticket);
                }
                LeadOutcome::Failed { .. } => show_notice(widget),
                LeadOutcome::Ignored | LeadOutcome::Discarded => {}
            },
        }
    }

    println!();
    Ok(())
}

/// Accept a 1-based index into [`BLOCKERS`] or the blocker text itself.
fn parse_blocker(input: &str) -> Option<&'static str> {
    if let Ok(n) = input.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| BLOCKERS.get(i)).copied();
    }
    BLOCKERS
        .iter()
        .find(|b| b.eq_ignore_ascii_case(input))
        .copied()
}

/// Obscure the plan behind the email gate, keeping its shape.
fn blur(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_whitespace() { c } else { '░' })
        .collect()
}

fn render(widget: &ReconnectWidget) -> Result<()> {
    println!();
    match widget.screen() {
        WidgetScreen::Name => {
            header("👋", "Reconnect");
            println!("  {BOLD}What's your name?{RESET}");
        }
        WidgetScreen::Blocker { name } => {
            header("🧭", &format!("Hi {name}"));
            println!("  Select one that best describes your situation:");
            for (i, blocker) in BLOCKERS.iter().enumerate() {
                println!("  {CYAN}{:>2}{RESET}  {blocker}", i + 1);
            }
            println!("  {DIM}b = back, q = close{RESET}");
        }
        WidgetScreen::Plan { plan, .. } => {
            header("📝", "Your personalized plan");
            match plan {
                PlanView::Loading => println!("  {DIM}Creating your personalized plan...{RESET}"),
                PlanView::Ready(text) => {
                    for line in blur(&text).lines().take(6) {
                        println!("  {DIM}{line}{RESET}");
                    }
                    println!();
                    println!("  {BOLD}Enter your email to view your plan{RESET}");
                    println!("  {DIM}We'll send you the full plan and helpful resources{RESET}");
                    println!("  {DIM}b = back, q = close{RESET}");
                }
            }
        }
    }
    print_prompt()
}

fn print_prompt() -> Result<()> {
    use std::io::Write as _;
    print!("  › ");
    std::io::stdout().flush().context("failed to flush stdout")
}

fn show_notice(widget: &ReconnectWidget) {
    match widget.notice() {
        Some(Notice::Success(msg)) => println!("  {GREEN}{BOLD}✓{RESET} {msg}"),
        Some(Notice::Error(msg)) => println!("  {RED}{BOLD}✗{RESET} {msg}"),
        None => {}
    }
}

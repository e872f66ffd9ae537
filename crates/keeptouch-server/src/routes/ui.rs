//! Marketing pages.
//!
//! Serves the landing page at `/` plus `/terms` and `/privacy`. The pages
//! are rendered server-side from constants; the signup and feedback forms
//! post JSON to `/api/signup` and `/api/feedback` with a small inline
//! script.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::Router;
use axum::response::Html;
use axum::routing::get;

use crate::state::AppState;

/// Build the UI router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(landing_page))
        .route("/terms", get(terms_page))
        .route("/privacy", get(privacy_page))
}

// ── Content ──────────────────────────────────────────────────────────

/// `(title, subtitle)` pairs cycled in the hero.
const HEADLINES: [(&str, &str); 5] = [
    (
        "You have 942 followers and forgot to text your dad back.",
        "The AI that keeps your relationships close, even when life pulls you away.",
    ),
    (
        "Grandma won't be around forever.",
        "Neither will that investor, that friend, that crush. Stay connected.",
    ),
    (
        "People drift. You don't have to.",
        "Let AI remember who matters, and when to reach out.",
    ),
    (
        "That deal WILL walk if you ghost again.",
        "Not anymore.",
    ),
    (
        "You remember everyone's birthday. Except the ones that matter most.",
        "This fixes that.",
    ),
];

const FEATURES: [(&str, &str); 4] = [
    (
        "Contact Management",
        "Organize your relationships in one place with smart reminders for follow-ups.",
    ),
    (
        "Important Dates",
        "Never miss a birthday or anniversary with automatic reminders for special occasions.",
    ),
    (
        "Intelligent Reminders",
        "Get personalized suggestions on when to reach out based on your communication patterns.",
    ),
    (
        "Conversation Insights",
        "Helpful context and previous topics to make every conversation more meaningful.",
    ),
];

const EMOTIONAL_STATEMENTS: [&str; 4] = [
    "There's someone you haven't talked to in months who thinks about you often.",
    "This is for the ones you meant to stay close to.",
    "You don't need a CRM for sales. You need one for your soul.",
    "You don't need more friends. Just better memory.",
];

const USE_CASES: [(&str, &str); 4] = [
    (
        "Never miss important dates",
        "KeepTouch automatically reminds you of birthdays, anniversaries, and other important milestones.",
    ),
    (
        "Reconnect with old friends",
        "Get gentle nudges to reach out to friends you haven't spoken with in a while.",
    ),
    (
        "Strengthen professional relationships",
        "Maintain your network with timely follow-ups after meetings or conferences.",
    ),
    (
        "Schedule quality time",
        "Plan regular check-ins with your closest connections to nurture those relationships.",
    ),
];

// ── Handlers ─────────────────────────────────────────────────────────

async fn landing_page() -> Html<String> {
    Html(render_landing())
}

async fn terms_page() -> Html<String> {
    Html(render_document("Terms of Use", TERMS_BODY))
}

async fn privacy_page() -> Html<String> {
    Html(render_document("Privacy Policy", PRIVACY_BODY))
}

fn render_landing() -> String {
    let mut html = String::with_capacity(16384);
    html.push_str(&page_head("KeepTouch &mdash; Never lose touch with the people who matter"));
    html.push_str(HERO);

    html.push_str(r#"<section class="headlines">"#);
    for (i, (title, subtitle)) in HEADLINES.iter().enumerate() {
        let hidden = if i == 0 { "" } else { " hidden" };
        let _ = write!(
            html,
            r#"<div class="headline"{hidden}><h2>{title}</h2><p>{subtitle}</p></div>"#
        );
    }
    html.push_str("</section>");

    html.push_str(r#"<section class="features"><h2>How KeepTouch works</h2><div class="grid">"#);
    for (title, description) in FEATURES {
        let _ = write!(html, "<article><h3>{title}</h3><p>{description}</p></article>");
    }
    html.push_str("</div></section>");

    html.push_str(r#"<section class="statements">"#);
    for statement in EMOTIONAL_STATEMENTS {
        let _ = write!(html, "<blockquote>{statement}</blockquote>");
    }
    html.push_str("</section>");

    html.push_str(FEEDBACK_FORM);

    html.push_str(r#"<section class="use-cases"><div class="grid">"#);
    for (title, description) in USE_CASES {
        let _ = write!(html, "<article><h3>{title}</h3><p>{description}</p></article>");
    }
    html.push_str("</div></section>");

    html.push_str(FOOTER);
    html.push_str(FORM_SCRIPT);
    html.push_str("</body></html>");
    html
}

fn render_document(title: &str, body: &str) -> String {
    let mut html = page_head(&format!("{title} &mdash; KeepTouch"));
    let _ = write!(
        html,
        r#"<main class="doc"><h1>{title}</h1><p class="muted">Last updated: July 10, 2025</p>{body}</main>"#
    );
    html.push_str(FOOTER);
    html.push_str("</body></html>");
    html
}

fn page_head(title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en"><head><meta charset="utf-8"/><meta name="viewport" content="width=device-width,initial-scale=1"/>
<title>{title}</title>
<style>{PAGE_CSS}</style>
</head><body>"#
    )
}

const PAGE_CSS: &str = "*,*::before,*::after{box-sizing:border-box;margin:0;padding:0}\
body{font-family:-apple-system,'Segoe UI',sans-serif;color:#1f2937;line-height:1.6}\
section,main.doc{max-width:960px;margin:0 auto;padding:48px 24px}\
.hero{text-align:center}.hero h1{font-size:2.5rem;margin-bottom:16px}\
.grid{display:grid;grid-template-columns:repeat(auto-fit,minmax(200px,1fr));gap:24px}\
.statements blockquote{font-size:1.25rem;margin:16px 0}\
form{display:flex;gap:8px;flex-wrap:wrap;justify-content:center;margin-top:24px}\
input,textarea{padding:10px;border:1px solid #d1d5db;border-radius:8px}\
button{padding:10px 18px;border:0;border-radius:8px;background:#2563eb;color:#fff;cursor:pointer}\
.muted{color:#6b7280}[hidden]{display:none}footer{text-align:center;padding:32px;color:#6b7280}";

const HERO: &str = r#"<section class="hero">
<h1>Never lose touch with the people who matter</h1>
<p>KeepTouch is your AI relationship assistant that helps you nurture your personal and professional connections.</p>
<form id="signup-form"><input type="email" name="email" placeholder="Enter your email" required/><button type="submit">Join the Beta</button></form>
<p class="form-status" id="signup-status" role="status"></p>
</section>"#;

const FEEDBACK_FORM: &str = r#"<section class="feedback">
<h2>We'd love to hear from you</h2>
<form id="feedback-form">
<label for="feedback">What's the hardest part about staying in touch with people?</label>
<textarea id="feedback" name="feedback" placeholder="Share your thoughts..." required></textarea>
<input type="email" name="email" placeholder="Your email (optional)"/>
<button type="submit">Send feedback</button>
</form>
<p class="form-status" id="feedback-status" role="status"></p>
</section>"#;

const FOOTER: &str = r#"<footer><a href="/">KeepTouch</a> &middot; <a href="/terms">Terms</a> &middot; <a href="/privacy">Privacy</a></footer>"#;

const FORM_SCRIPT: &str = r#"<script>
function wire(formId, statusId, url, ok) {
  const form = document.getElementById(formId);
  const status = document.getElementById(statusId);
  form.addEventListener("submit", async (event) => {
    event.preventDefault();
    const body = Object.fromEntries(new FormData(form).entries());
    try {
      const res = await fetch(url, {method: "POST", headers: {"Content-Type": "application/json"}, body: JSON.stringify(body)});
      if (!res.ok) throw new Error(res.status);
      form.reset();
      status.textContent = ok;
    } catch (e) {
      status.textContent = "Something went wrong. Please try again later.";
    }
  });
}
wire("signup-form", "signup-status", "/api/signup", "Thanks for joining! We'll be in touch about the beta soon.");
wire("feedback-form", "feedback-status", "/api/feedback", "Feedback received! Thank you for sharing your thoughts with us.");
const headlines = document.querySelectorAll(".headline");
let active = 0;
setInterval(() => {
  headlines[active].hidden = true;
  active = (active + 1) % headlines.length;
  headlines[active].hidden = false;
}, 6000);
</script>"#;

const TERMS_BODY: &str = r#"<h2>1. Acceptance of Terms</h2>
<p>By downloading, installing, or using KeepTouch ("the App"), you agree to be bound by these Terms of Use. If you do not agree to these terms, please do not use the App.</p>
<h2>2. Description of Service</h2>
<p>KeepTouch is a relationship management app that helps users maintain connections with important people in their lives through reminders and AI-generated message suggestions.</p>
<h2>3. Privacy and Data</h2>
<p>Your use of the App is also governed by our <a href="/privacy">Privacy Policy</a>.</p>
<h2>4. Changes to Terms</h2>
<p>We may update these Terms from time to time. Continued use of the App after changes constitutes acceptance of the new Terms.</p>
<h2>5. Contact Information</h2>
<p>If you have questions about these Terms, please contact us at support@keeptouch.app</p>"#;

const PRIVACY_BODY: &str = r#"<h2>Introduction</h2>
<p>KeepTouch ("we", "our", or "us") respects your privacy and is committed to protecting your personal data. This privacy policy explains how we collect, use, and safeguard your information when you use our mobile application.</p>
<h2>Information We Collect</h2>
<p>When you join the beta, request a reconnection plan, or send feedback we store the email address, names and answers you provide.</p>
<h2>How We Use Your Information</h2>
<p>We use your information to send you your plan, keep you updated about the beta, and improve KeepTouch.</p>
<h2>Your Rights</h2>
<p>To exercise your rights to access, correct, or delete your data, contact us at support@keeptouch.app</p>"#;

//! The reconnect widget.
//!
//! Composes a [`StepFlow`] over three fixed steps with a [`Persisted`]
//! [`WidgetState`] stored under [`WIDGET_STATE_KEY`]:
//!
//! ```text
//! name ──(non-empty name)──▶ blocker ──(pick blocker)──▶ plan ──(email ok)──▶ reset + close
//!  ▲                            │  ▲                       │
//!  └──────────── back ──────────┘  └──────── back ─────────┘
//! ```
//!
//! The plan fetch and the lead submission are the only operations that wait
//! on the outside world. Each is split into `begin_*`, which hands out a
//! ticket, and `finish_*`, which applies the response only while the ticket
//! is still current. Closing the widget invalidates every outstanding
//! ticket, so a response that arrives after the view is gone is dropped
//! instead of mutating state.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{ClientError, FlowError};
use crate::flow::{StepData, StepFlow};
use crate::lead::{LeadReceipt, LeadRequest};
use crate::persist::{Persisted, PersistedStore};

/// Storage slot holding the serialized [`WidgetState`].
pub const WIDGET_STATE_KEY: &str = "kt_widget_state";

/// How long the success notice stays visible before the widget closes.
pub const CLOSE_DELAY: Duration = Duration::from_millis(1500);

/// Blockers offered on the blocker step.
pub const BLOCKERS: [&str; 7] = [
    "No time",
    "Too busy",
    "Not sure where to start",
    "Feeling overwhelmed",
    "Need motivation",
    "Family commitments",
    "Work pressure",
];

/// Shown behind the email gate until a generated plan is available, and
/// when the generator answers with nothing.
pub const SAMPLE_PLAN: &str = "Here's a personalized reconnection plan based on your situation:

1. Start with just 5 minutes daily of focused activity
2. Break down overwhelming tasks into smaller steps
3. Create a simple daily routine that includes small wins
4. Use accountability partners or groups to stay motivated
5. Track your progress and celebrate small achievements

This plan is designed to help you overcome your specific challenges and build momentum gradually.";

/// Plan text used when the plan fetch fails.
pub const UNAVAILABLE_PLAN: &str = "Unable to generate plan at this time. Please try again later.";

pub const SUBMIT_FAILED_NOTICE: &str = "Sorry, we couldn't process your submission. Please try again.";

pub const SUBMITTED_NOTICE: &str = "Thanks! Your plan is on its way.";

/// The widget's steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetStep {
    Name,
    Blocker,
    Plan,
}

impl WidgetStep {
    pub const ALL: [Self; 3] = [Self::Name, Self::Blocker, Self::Plan];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Blocker => "blocker",
            Self::Plan => "plan",
        }
    }
}

impl fmt::Display for WidgetStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answers that survive a reload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WidgetState {
    pub name: String,
    pub blocker: String,
    pub plan: String,
    /// Step names in completion order, without duplicates.
    pub completed_steps: Vec<String>,
}

impl WidgetState {
    /// Record `step` as completed. A step completed again moves to the end.
    pub fn mark_completed(&mut self, step: WidgetStep) {
        self.completed_steps.retain(|s| s != step.as_str());
        self.completed_steps.push(step.as_str().to_owned());
    }

    pub fn is_completed(&self, step: WidgetStep) -> bool {
        self.completed_steps.iter().any(|s| s == step.as_str())
    }

    /// Where a remounted widget picks up.
    #[must_use]
    pub fn resume_step(&self) -> WidgetStep {
        match (
            self.is_completed(WidgetStep::Name),
            self.is_completed(WidgetStep::Blocker),
        ) {
            (true, true) => WidgetStep::Plan,
            (true, false) => WidgetStep::Blocker,
            _ => WidgetStep::Name,
        }
    }
}

/// What the plan area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanView {
    Loading,
    Ready(String),
}

/// The current screen with exactly the data it renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetScreen {
    Name,
    Blocker {
        name: String,
    },
    Plan {
        name: String,
        blocker: String,
        plan: PlanView,
    },
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Fetches a generated plan for `(name, blocker)`.
#[async_trait::async_trait]
pub trait PlanSource: Send + Sync + 'static {
    /// # Errors
    ///
    /// Returns a [`ClientError`] if the plan could not be fetched.
    async fn fetch_plan(&self, name: &str, blocker: &str) -> Result<String, ClientError>;
}

/// Submits a captured lead.
#[async_trait::async_trait]
pub trait LeadSink: Send + Sync + 'static {
    /// # Errors
    ///
    /// Returns a [`ClientError`] if the submission never got an answer.
    async fn submit_lead(&self, lead: &LeadRequest) -> Result<LeadReceipt, ClientError>;
}

/// Handle for an in-flight plan fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanTicket {
    generation: u64,
    name: String,
    blocker: String,
}

impl PlanTicket {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn blocker(&self) -> &str {
        &self.blocker
    }
}

/// Handle for an in-flight lead submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadTicket {
    generation: u64,
    request: LeadRequest,
}

impl LeadTicket {
    pub fn request(&self) -> &LeadRequest {
        &self.request
    }
}

/// Handle for the delayed close after a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseTicket {
    generation: u64,
}

impl CloseTicket {
    pub const fn delay(self) -> Duration {
        CLOSE_DELAY
    }
}

/// Result of an email submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeadOutcome {
    /// Blank email, wrong step, or a submission already in flight.
    Ignored,
    /// Accepted; state is reset and the widget should close after the delay.
    Submitted(CloseTicket),
    /// Rejected or unreachable; the user stays on the plan step.
    Failed { message: String },
    /// The widget was closed before the answer came back.
    Discarded,
}

/// The reconnect widget: step flow, persisted answers, and the two remote
/// collaborators.
pub struct ReconnectWidget {
    flow: StepFlow<WidgetStep>,
    state: Persisted<WidgetState>,
    plans: Arc<dyn PlanSource>,
    leads: Arc<dyn LeadSink>,
    plan_text: String,
    email: String,
    open: bool,
    loading: bool,
    submitting: bool,
    notice: Option<Notice>,
    generation: u64,
}

impl fmt::Debug for ReconnectWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReconnectWidget")
            .field("step", self.flow.current_step())
            .field("open", &self.open)
            .field("loading", &self.loading)
            .field("submitting", &self.submitting)
            .finish_non_exhaustive()
    }
}

fn payload(key: &str, value: &str) -> StepData {
    let mut data = StepData::new();
    data.insert(key.to_owned(), Value::String(value.to_owned()));
    data
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_owned())
}

impl ReconnectWidget {
    /// Hydrate answers from `store` and resume at the furthest completed
    /// step. The widget starts closed.
    ///
    /// # Errors
    ///
    /// Returns a [`FlowError`] if the step flow cannot be built.
    pub async fn mount(
        store: PersistedStore,
        plans: Arc<dyn PlanSource>,
        leads: Arc<dyn LeadSink>,
    ) -> Result<Self, FlowError> {
        let state = Persisted::hydrate(store, WIDGET_STATE_KEY, WidgetState::default()).await;
        let flow = StepFlow::new(WidgetStep::ALL, state.get().resume_step())?;
        let plan_text = non_empty(&state.get().plan).unwrap_or_else(|| SAMPLE_PLAN.to_owned());
        tracing::debug!(step = %flow.current_step(), "reconnect widget mounted");
        Ok(Self {
            flow,
            state,
            plans,
            leads,
            plan_text,
            email: String::new(),
            open: false,
            loading: false,
            submitting: false,
            notice: None,
            generation: 0,
        })
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close the widget and drop interest in anything still in flight.
    pub fn close(&mut self) {
        self.open = false;
        self.loading = false;
        self.submitting = false;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn current_step(&self) -> WidgetStep {
        *self.flow.current_step()
    }

    pub fn flow(&self) -> &StepFlow<WidgetStep> {
        &self.flow
    }

    pub fn state(&self) -> &WidgetState {
        self.state.get()
    }

    /// Plan text behind the email gate.
    pub fn plan_text(&self) -> &str {
        &self.plan_text
    }

    /// Current contents of the email field.
    pub fn email_input(&self) -> &str {
        &self.email
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub fn screen(&self) -> WidgetScreen {
        let state = self.state.get();
        match self.current_step() {
            WidgetStep::Name => WidgetScreen::Name,
            WidgetStep::Blocker => WidgetScreen::Blocker {
                name: state.name.clone(),
            },
            WidgetStep::Plan => WidgetScreen::Plan {
                name: state.name.clone(),
                blocker: state.blocker.clone(),
                plan: if self.loading {
                    PlanView::Loading
                } else {
                    PlanView::Ready(self.plan_text.clone())
                },
            },
        }
    }

    /// Submit the name form. Blank input is ignored without feedback.
    pub async fn submit_name(&mut self, input: &str) -> bool {
        let name = input.trim();
        if name.is_empty() || self.current_step() != WidgetStep::Name {
            return false;
        }
        let name = name.to_owned();
        self.state
            .update(|s| {
                s.name.clone_from(&name);
                s.mark_completed(WidgetStep::Name);
            })
            .await;
        self.flow.advance(WidgetStep::Blocker, payload("name", &name))
    }

    /// Go back one step. Ignored while a plan is loading.
    pub fn back(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.flow.retreat()
    }

    /// Record the chosen blocker, move to the plan step in its loading state,
    /// and hand out the ticket for the fetch.
    pub async fn begin_plan_fetch(&mut self, blocker: &str) -> Option<PlanTicket> {
        if self.loading || self.current_step() != WidgetStep::Blocker {
            return None;
        }
        let blocker = blocker.to_owned();
        self.state
            .update(|s| {
                s.blocker.clone_from(&blocker);
                s.mark_completed(WidgetStep::Blocker);
            })
            .await;
        self.loading = true;
        self.flow.advance(WidgetStep::Plan, payload("blocker", &blocker));
        Some(PlanTicket {
            generation: self.generation,
            name: self.state.get().name.clone(),
            blocker,
        })
    }

    /// Apply the fetch result. A failed fetch shows [`UNAVAILABLE_PLAN`], an
    /// empty one [`SAMPLE_PLAN`]. Returns `false` if the ticket is stale.
    pub async fn finish_plan_fetch(
        &mut self,
        ticket: PlanTicket,
        result: Result<String, ClientError>,
    ) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(blocker = %ticket.blocker, "discarding plan for a closed widget");
            return false;
        }
        let text = match result {
            Ok(text) if text.trim().is_empty() => SAMPLE_PLAN.to_owned(),
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch plan, showing fallback");
                UNAVAILABLE_PLAN.to_owned()
            }
        };
        self.state.update(|s| s.plan.clone_from(&text)).await;
        self.plan_text = text;
        self.loading = false;
        true
    }

    /// Pick a blocker and wait for the generated plan.
    pub async fn select_blocker(&mut self, blocker: &str) -> bool {
        let Some(ticket) = self.begin_plan_fetch(blocker).await else {
            return false;
        };
        let plans = Arc::clone(&self.plans);
        let result = plans.fetch_plan(ticket.name(), ticket.blocker()).await;
        self.finish_plan_fetch(ticket, result).await
    }

    /// Capture the email field and, if it is usable, start the submission.
    pub fn begin_lead_submission(&mut self, email: &str) -> Option<LeadTicket> {
        email.clone_into(&mut self.email);
        let email = email.trim();
        if email.is_empty()
            || self.submitting
            || self.loading
            || self.current_step() != WidgetStep::Plan
        {
            return None;
        }
        self.submitting = true;
        let state = self.state.get();
        Some(LeadTicket {
            generation: self.generation,
            request: LeadRequest {
                email: email.to_owned(),
                person: non_empty(&state.name),
                block: non_empty(&state.blocker),
                plan: non_empty(&self.plan_text),
            },
        })
    }

    /// Apply the submission result.
    ///
    /// On success the stored answers go back to defaults and the flow to the
    /// name step right away; the returned [`CloseTicket`] closes the widget
    /// once [`CLOSE_DELAY`] has passed. On failure the email field and step
    /// are left as they were.
    pub async fn finish_lead_submission(
        &mut self,
        ticket: LeadTicket,
        result: Result<LeadReceipt, ClientError>,
    ) -> LeadOutcome {
        if ticket.generation != self.generation {
            tracing::debug!("discarding lead result for a closed widget");
            return LeadOutcome::Discarded;
        }
        self.submitting = false;
        let message = match result {
            Ok(receipt) if receipt.success => {
                self.state.replace(WidgetState::default()).await;
                self.flow.reset(WidgetStep::Name);
                self.plan_text = SAMPLE_PLAN.to_owned();
                self.email.clear();
                self.notice = Some(Notice::Success(SUBMITTED_NOTICE.to_owned()));
                return LeadOutcome::Submitted(CloseTicket {
                    generation: self.generation,
                });
            }
            Ok(receipt) => receipt.message,
            Err(e) => e.to_string(),
        };
        tracing::warn!(error = %message, "failed to submit lead");
        self.notice = Some(Notice::Error(SUBMIT_FAILED_NOTICE.to_owned()));
        LeadOutcome::Failed { message }
    }

    /// Submit the email gate and wait for the answer.
    pub async fn submit_email(&mut self, email: &str) -> LeadOutcome {
        let Some(ticket) = self.begin_lead_submission(email) else {
            return LeadOutcome::Ignored;
        };
        let leads = Arc::clone(&self.leads);
        let result = leads.submit_lead(ticket.request()).await;
        self.finish_lead_submission(ticket, result).await
    }

    /// Close after a successful submission, unless the widget was already
    /// closed (and possibly reopened) in the meantime.
    pub fn finish_close(&mut self, ticket: CloseTicket) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.close();
        true
    }

    /// Snapshot of the flow's collected data, for diagnostics.
    pub fn flow_data(&self) -> Value {
        json!(self.flow.data())
    }
}

//! Lead capture: reconnect leads, beta signups, and free-text feedback.
//!
//! The three flat tables (`leads`, `beta_signups`, `feedback`) sit behind
//! [`LeadRepository`]. Validation lives here so every front door (the HTTP
//! routes, the collect function, tests) rejects the same inputs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::LeadError;

/// Wire body shared by `POST /api/lead` and the collect function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub person: Option<String>,
    #[serde(default)]
    pub block: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
}

/// Outcome reported to the widget after a lead submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadReceipt {
    pub success: bool,
    pub message: String,
}

impl LeadReceipt {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// A validated lead ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    pub email: String,
    pub person: Option<String>,
    pub block: Option<String>,
    pub plan: Option<String>,
}

impl NewLead {
    /// Validate a request. The email is required; blank optional fields are
    /// stored as absent.
    ///
    /// # Errors
    ///
    /// Returns [`LeadError::MissingField`] when the email is blank.
    pub fn from_request(req: LeadRequest) -> Result<Self, LeadError> {
        let email = required(&req.email, "Email")?;
        Ok(Self {
            email,
            person: optional(req.person),
            block: optional(req.block),
            plan: optional(req.plan),
        })
    }
}

/// A stored lead row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadRecord {
    pub id: Uuid,
    pub email: String,
    pub person: Option<String>,
    pub block: Option<String>,
    pub plan: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/signup`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub email: String,
}

/// A stored beta signup row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignupRecord {
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/feedback`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A validated feedback entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeedback {
    pub feedback: String,
    pub email: Option<String>,
}

impl NewFeedback {
    /// # Errors
    ///
    /// Returns [`LeadError::MissingField`] when the feedback text is blank.
    pub fn from_request(req: FeedbackRequest) -> Result<Self, LeadError> {
        if req.feedback.trim().is_empty() {
            return Err(LeadError::MissingField { field: "Feedback" });
        }
        Ok(Self {
            feedback: req.feedback,
            email: optional(req.email),
        })
    }
}

/// A stored feedback row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackRecord {
    pub feedback: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validate a signup email.
///
/// # Errors
///
/// Returns [`LeadError::MissingField`] when the email is blank.
pub fn signup_email(req: SignupRequest) -> Result<String, LeadError> {
    required(&req.email, "Email")
}

fn required(value: &str, field: &'static str) -> Result<String, LeadError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LeadError::MissingField { field });
    }
    Ok(trimmed.to_owned())
}

fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Persistence for the lead-capture tables.
#[async_trait::async_trait]
pub trait LeadRepository: Send + Sync + 'static {
    /// Insert one row into `leads` and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`LeadError::Repository`] if the insert fails.
    async fn insert_lead(&self, lead: NewLead) -> Result<Uuid, LeadError>;

    /// Insert one row into `beta_signups`.
    ///
    /// # Errors
    ///
    /// Returns [`LeadError::Repository`] if the insert fails.
    async fn insert_signup(&self, email: &str) -> Result<(), LeadError>;

    /// Insert one row into `feedback`.
    ///
    /// # Errors
    ///
    /// Returns [`LeadError::Repository`] if the insert fails.
    async fn insert_feedback(&self, feedback: NewFeedback) -> Result<(), LeadError>;
}

#[derive(Debug, Default)]
struct Tables {
    leads: Vec<LeadRecord>,
    signups: Vec<SignupRecord>,
    feedback: Vec<FeedbackRecord>,
}

/// In-memory repository for development and tests. Clones share tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryLeadRepository {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryLeadRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn leads(&self) -> Vec<LeadRecord> {
        self.tables.read().await.leads.clone()
    }

    pub async fn signups(&self) -> Vec<SignupRecord> {
        self.tables.read().await.signups.clone()
    }

    pub async fn feedback(&self) -> Vec<FeedbackRecord> {
        self.tables.read().await.feedback.clone()
    }
}

#[async_trait::async_trait]
impl LeadRepository for MemoryLeadRepository {
    async fn insert_lead(&self, lead: NewLead) -> Result<Uuid, LeadError> {
        let id = Uuid::new_v4();
        self.tables.write().await.leads.push(LeadRecord {
            id,
            email: lead.email,
            person: lead.person,
            block: lead.block,
            plan: lead.plan,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn insert_signup(&self, email: &str) -> Result<(), LeadError> {
        self.tables.write().await.signups.push(SignupRecord {
            email: email.to_owned(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn insert_feedback(&self, feedback: NewFeedback) -> Result<(), LeadError> {
        self.tables.write().await.feedback.push(FeedbackRecord {
            feedback: feedback.feedback,
            email: feedback.email,
            created_at: Utc::now(),
        });
        Ok(())
    }
}

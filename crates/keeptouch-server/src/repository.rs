//! `PostgreSQL` lead repository.
//!
//! Stores the three lead-capture tables with parameterized sqlx queries.
//! The tables are created on connect if they do not exist yet.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use keeptouch_core::error::LeadError;
use keeptouch_core::lead::{LeadRepository, NewFeedback, NewLead};

const SCHEMA: [&str; 3] = [
    r"CREATE TABLE IF NOT EXISTS leads (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL,
        person TEXT,
        block TEXT,
        plan TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    r"CREATE TABLE IF NOT EXISTS beta_signups (
        id BIGSERIAL PRIMARY KEY,
        email TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    r"CREATE TABLE IF NOT EXISTS feedback (
        id BIGSERIAL PRIMARY KEY,
        feedback TEXT NOT NULL,
        email TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
];

fn repo_err(e: &sqlx::Error) -> LeadError {
    LeadError::Repository {
        reason: e.to_string(),
    }
}

/// Lead repository backed by a `PgPool`.
#[derive(Debug, Clone)]
pub struct PgLeadRepository {
    pool: PgPool,
}

impl PgLeadRepository {
    /// Connect to `url` and make sure the tables exist.
    ///
    /// # Errors
    ///
    /// Returns [`LeadError::Repository`] if the connection or the schema
    /// statements fail.
    pub async fn connect(url: &str) -> Result<Self, LeadError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| repo_err(&e))?;
        let repo = Self { pool };
        repo.ensure_schema().await?;
        Ok(repo)
    }

    /// Create the tables if missing.
    ///
    /// # Errors
    ///
    /// Returns [`LeadError::Repository`] on database failure.
    pub async fn ensure_schema(&self) -> Result<(), LeadError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| repo_err(&e))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl LeadRepository for PgLeadRepository {
    async fn insert_lead(&self, lead: NewLead) -> Result<Uuid, LeadError> {
        sqlx::query_scalar::<_, Uuid>(
            r"INSERT INTO leads (id, email, person, block, plan)
              VALUES ($1, $2, $3, $4, $5)
              RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(&lead.email)
        .bind(&lead.person)
        .bind(&lead.block)
        .bind(&lead.plan)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| repo_err(&e))
    }

    async fn insert_signup(&self, email: &str) -> Result<(), LeadError> {
        sqlx::query("INSERT INTO beta_signups (email) VALUES ($1)")
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(|e| repo_err(&e))?;
        Ok(())
    }

    async fn insert_feedback(&self, feedback: NewFeedback) -> Result<(), LeadError> {
        sqlx::query("INSERT INTO feedback (feedback, email) VALUES ($1, $2)")
            .bind(&feedback.feedback)
            .bind(&feedback.email)
            .execute(&self.pool)
            .await
            .map_err(|e| repo_err(&e))?;
        Ok(())
    }
}

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::intake::audit::{self, NewLogEntry};
use crate::mappings;
use crate::models::job_mapping::JobMappingRow;

/// A fully-derived application record, ready for the idempotency claim.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub id: Uuid,
    pub external_delivery_id: Option<String>,
    pub candidate_name: String,
    pub candidate_email: String,
    pub candidate_phone: String,
    pub resume_text: String,
    pub resume_s3_key: Option<String>,
    pub external_job_id: String,
    pub external_job_title: String,
    pub received_at: DateTime<Utc>,
}

/// Persistence seam for the intake pipeline. Production wires the Postgres
/// implementation; coordinator tests inject an in-memory double.
#[async_trait]
pub trait IntakeRepo: Send + Sync {
    /// Atomically claims the delivery id: inserts the application and returns
    /// its id, or `None` when another delivery already holds the id.
    async fn claim_application(&self, new: &NewApplication) -> Result<Option<Uuid>>;

    /// Id of the application that already holds this delivery id.
    async fn application_for_delivery(&self, delivery_id: &str) -> Result<Uuid>;

    /// Attaches scoring results to a claimed application.
    async fn attach_match(
        &self,
        application_id: Uuid,
        score: f64,
        summary: Option<&str>,
        internal_job_id: Option<Uuid>,
        status: &str,
    ) -> Result<()>;

    async fn resolve_mapping(&self, external_job_id: &str) -> Result<Option<JobMappingRow>>;

    async fn append_log(&self, entry: &NewLogEntry) -> Result<()>;
}

pub struct PgIntakeRepo {
    pool: PgPool,
}

impl PgIntakeRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IntakeRepo for PgIntakeRepo {
    async fn claim_application(&self, new: &NewApplication) -> Result<Option<Uuid>> {
        // The unique constraint on external_delivery_id arbitrates concurrent
        // redeliveries: exactly one insert wins, the loser gets no row back.
        // A NULL delivery id never conflicts, so deliveries without an id are
        // each treated as distinct events.
        Ok(sqlx::query_scalar(
            r#"
            INSERT INTO applications
                (id, external_delivery_id, candidate_name, candidate_email,
                 candidate_phone, resume_text, resume_s3_key,
                 external_job_id, external_job_title, status, received_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'received', $10)
            ON CONFLICT (external_delivery_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(new.id)
        .bind(&new.external_delivery_id)
        .bind(&new.candidate_name)
        .bind(&new.candidate_email)
        .bind(&new.candidate_phone)
        .bind(&new.resume_text)
        .bind(&new.resume_s3_key)
        .bind(&new.external_job_id)
        .bind(&new.external_job_title)
        .bind(new.received_at)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn application_for_delivery(&self, delivery_id: &str) -> Result<Uuid> {
        Ok(
            sqlx::query_scalar("SELECT id FROM applications WHERE external_delivery_id = $1")
                .bind(delivery_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn attach_match(
        &self,
        application_id: Uuid,
        score: f64,
        summary: Option<&str>,
        internal_job_id: Option<Uuid>,
        status: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE applications
            SET match_score = $1, match_summary = $2, internal_job_id = $3, status = $4
            WHERE id = $5
            "#,
        )
        .bind(score)
        .bind(summary)
        .bind(internal_job_id)
        .bind(status)
        .bind(application_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn resolve_mapping(&self, external_job_id: &str) -> Result<Option<JobMappingRow>> {
        mappings::resolve(&self.pool, external_job_id).await
    }

    async fn append_log(&self, entry: &NewLogEntry) -> Result<()> {
        audit::append(&self.pool, entry).await.map(|_| ())
    }
}

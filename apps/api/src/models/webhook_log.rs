use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row per inbound webhook delivery attempt, append-only.
/// Applicant name/email and job fields are denormalized for quick triage.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WebhookLogRow {
    pub id: Uuid,
    pub delivery_id: String,
    pub applicant_name: String,
    pub applicant_email: String,
    pub external_job_id: String,
    pub external_job_title: String,
    /// `success`, `duplicate` or `error`.
    pub status: String,
    pub application_id: Option<Uuid>,
    pub error_message: Option<String>,
    /// Raw request body, truncated to the configured cap.
    pub raw_payload: String,
    pub received_at: DateTime<Utc>,
}

/// Aggregate counts served to the operations dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookLogStats {
    pub total: i64,
    pub success: i64,
    pub duplicate: i64,
    pub error: i64,
    pub last_24h: i64,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A job application created by the webhook intake pipeline.
///
/// `external_delivery_id` is NULL when the sender omitted a delivery id; the
/// unique constraint on the column treats NULLs as distinct, so such
/// deliveries are never collapsed into each other.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub external_delivery_id: Option<String>,
    pub candidate_name: String,
    pub candidate_email: String,
    pub candidate_phone: String,
    pub resume_text: String,
    pub resume_s3_key: Option<String>,
    pub external_job_id: String,
    pub external_job_title: String,
    pub internal_job_id: Option<Uuid>,
    pub match_score: Option<f64>,
    pub match_summary: Option<String>,
    pub status: String,
    pub received_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

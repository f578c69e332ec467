use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Operator-maintained association between an external job-board posting id
/// and the internal job record. Upserted by `external_id`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobMappingRow {
    pub id: Uuid,
    pub external_id: String,
    pub internal_job_id: Uuid,
    pub title: String,
    pub location: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

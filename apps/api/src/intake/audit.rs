use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::models::webhook_log::{WebhookLogRow, WebhookLogStats};

/// Outcome recorded for one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStatus {
    Success,
    Duplicate,
    Error,
}

impl LogStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LogStatus::Success => "success",
            LogStatus::Duplicate => "duplicate",
            LogStatus::Error => "error",
        }
    }
}

/// One entry per inbound request, written exactly once regardless of outcome.
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    pub delivery_id: String,
    pub applicant_name: String,
    pub applicant_email: String,
    pub external_job_id: String,
    pub external_job_title: String,
    pub status: LogStatus,
    pub application_id: Option<Uuid>,
    pub error_message: Option<String>,
    /// Already truncated by the caller via `truncate_payload`.
    pub raw_payload: String,
    pub received_at: DateTime<Utc>,
}

/// Pure insert; the intake path never updates or deletes log rows.
pub async fn append(pool: &PgPool, entry: &NewLogEntry) -> Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO webhook_logs
            (id, delivery_id, applicant_name, applicant_email,
             external_job_id, external_job_title, status, application_id,
             error_message, raw_payload, received_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(id)
    .bind(&entry.delivery_id)
    .bind(&entry.applicant_name)
    .bind(&entry.applicant_email)
    .bind(&entry.external_job_id)
    .bind(&entry.external_job_title)
    .bind(entry.status.as_str())
    .bind(entry.application_id)
    .bind(&entry.error_message)
    .bind(&entry.raw_payload)
    .bind(entry.received_at)
    .execute(pool)
    .await?;
    Ok(id)
}

/// Append that swallows its own failure. Observability must never take down
/// the response path, so a failed log write is only worth a warning.
pub async fn append_best_effort(pool: &PgPool, entry: &NewLogEntry) {
    if let Err(e) = append(pool, entry).await {
        warn!(
            delivery_id = %entry.delivery_id,
            "Failed to write webhook log entry: {e}"
        );
    }
}

/// Most recent delivery attempts, for the operations dashboard.
pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<WebhookLogRow>> {
    Ok(sqlx::query_as::<_, WebhookLogRow>(
        "SELECT * FROM webhook_logs ORDER BY received_at DESC LIMIT $1",
    )
    .bind(limit.clamp(1, 500))
    .fetch_all(pool)
    .await?)
}

/// All attempts recorded for one external delivery id, oldest first —
/// the replay-diagnosis view.
pub async fn by_delivery_id(pool: &PgPool, delivery_id: &str) -> Result<Vec<WebhookLogRow>> {
    Ok(sqlx::query_as::<_, WebhookLogRow>(
        "SELECT * FROM webhook_logs WHERE delivery_id = $1 ORDER BY received_at ASC",
    )
    .bind(delivery_id)
    .fetch_all(pool)
    .await?)
}

/// Counts by status plus the trailing-24h total.
pub async fn stats(pool: &PgPool) -> Result<WebhookLogStats> {
    let row: (i64, i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*),
               COUNT(*) FILTER (WHERE status = 'success'),
               COUNT(*) FILTER (WHERE status = 'duplicate'),
               COUNT(*) FILTER (WHERE status = 'error')
        FROM webhook_logs
        "#,
    )
    .fetch_one(pool)
    .await?;

    let last_24h: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM webhook_logs WHERE received_at >= $1")
            .bind(Utc::now() - Duration::hours(24))
            .fetch_one(pool)
            .await?;

    Ok(WebhookLogStats {
        total: row.0,
        success: row.1,
        duplicate: row.2,
        error: row.3,
        last_24h,
    })
}

/// Caps the raw payload copy kept for audit. Counts chars, not bytes, so the
/// cut never lands inside a UTF-8 sequence.
pub fn truncate_payload(raw: &str, max_chars: usize) -> String {
    raw.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_payload_exact_cap() {
        let raw = "x".repeat(12_000);
        let truncated = truncate_payload(&raw, 10_000);
        assert_eq!(truncated.chars().count(), 10_000);
    }

    #[test]
    fn test_truncate_payload_short_input_unchanged() {
        assert_eq!(truncate_payload("{\"a\":1}", 10_000), "{\"a\":1}");
    }

    #[test]
    fn test_truncate_payload_multibyte_boundary() {
        let raw = "é".repeat(8);
        let truncated = truncate_payload(&raw, 5);
        assert_eq!(truncated, "é".repeat(5));
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(LogStatus::Success.as_str(), "success");
        assert_eq!(LogStatus::Duplicate.as_str(), "duplicate");
        assert_eq!(LogStatus::Error.as_str(), "error");
    }
}

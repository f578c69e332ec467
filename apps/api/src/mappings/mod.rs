pub mod handlers;

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::job_mapping::JobMappingRow;

/// Resolves an external job-board posting id to the internal job record.
/// Returns `None` when no active mapping exists; callers fall back to the
/// raw external title as free text.
pub async fn resolve(pool: &PgPool, external_id: &str) -> Result<Option<JobMappingRow>> {
    if external_id.is_empty() {
        return Ok(None);
    }
    Ok(sqlx::query_as::<_, JobMappingRow>(
        "SELECT * FROM job_mappings WHERE external_id = $1 AND active",
    )
    .bind(external_id)
    .fetch_optional(pool)
    .await?)
}

/// Creates or replaces the mapping for an external id.
pub async fn upsert(
    pool: &PgPool,
    external_id: &str,
    internal_job_id: Uuid,
    title: &str,
    location: Option<&str>,
    active: bool,
) -> Result<JobMappingRow> {
    Ok(sqlx::query_as::<_, JobMappingRow>(
        r#"
        INSERT INTO job_mappings (id, external_id, internal_job_id, title, location, active)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (external_id) DO UPDATE
            SET internal_job_id = EXCLUDED.internal_job_id,
                title = EXCLUDED.title,
                location = EXCLUDED.location,
                active = EXCLUDED.active,
                updated_at = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(external_id)
    .bind(internal_job_id)
    .bind(title)
    .bind(location)
    .bind(active)
    .fetch_one(pool)
    .await?)
}

pub async fn list(pool: &PgPool) -> Result<Vec<JobMappingRow>> {
    Ok(sqlx::query_as::<_, JobMappingRow>(
        "SELECT * FROM job_mappings ORDER BY updated_at DESC",
    )
    .fetch_all(pool)
    .await?)
}

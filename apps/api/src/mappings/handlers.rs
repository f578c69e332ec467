use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job_mapping::JobMappingRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpsertMappingRequest {
    pub external_id: String,
    pub internal_job_id: Uuid,
    pub title: String,
    pub location: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// GET /api/v1/job-mappings
pub async fn handle_list_mappings(
    State(state): State<AppState>,
) -> Result<Json<Vec<JobMappingRow>>, AppError> {
    let mappings = super::list(&state.db).await.map_err(AppError::Internal)?;
    Ok(Json(mappings))
}

/// PUT /api/v1/job-mappings — upsert by external id.
pub async fn handle_upsert_mapping(
    State(state): State<AppState>,
    Json(req): Json<UpsertMappingRequest>,
) -> Result<Json<JobMappingRow>, AppError> {
    if req.external_id.trim().is_empty() {
        return Err(AppError::Validation("external_id must not be empty".to_string()));
    }
    let mapping = super::upsert(
        &state.db,
        req.external_id.trim(),
        req.internal_job_id,
        &req.title,
        req.location.as_deref(),
        req.active,
    )
    .await
    .map_err(AppError::Internal)?;
    Ok(Json(mapping))
}

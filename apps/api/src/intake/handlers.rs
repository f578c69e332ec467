use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::intake::audit::{self, LogStatus, NewLogEntry};
use crate::intake::coordinator::{IntakeOutcome, IntakeResult};
use crate::intake::payload::IncomingApplicationPayload;
use crate::intake::signature::{self, SignatureCheck};
use crate::models::application::ApplicationRow;
use crate::models::webhook_log::{WebhookLogRow, WebhookLogStats};
use crate::state::AppState;

/// Header the job board uses for its HMAC hex digest.
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Body returned to the sender. Always paired with HTTP 200 (the sender
/// retries on any non-2xx, and retrying cannot fix our internal failures),
/// except for a genuine signature rejection.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<IntakeResult> for WebhookResponse {
    fn from(result: IntakeResult) -> Self {
        WebhookResponse {
            success: !matches!(result.outcome, IntakeOutcome::Error),
            application_id: result.application_id,
            status: result.status,
            error: result.error,
        }
    }
}

/// POST /webhook-intake
///
/// Takes the raw body so the signature is computed over the exact bytes the
/// sender signed; JSON decoding happens only after verification.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature_header = headers.get(SIGNATURE_HEADER).and_then(|h| h.to_str().ok());
    match signature::verify(&body, signature_header, state.config.webhook_secret.as_deref()) {
        SignatureCheck::Invalid => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid signature" })),
            )
                .into_response();
        }
        SignatureCheck::Valid | SignatureCheck::Skipped => {}
    }

    let raw = String::from_utf8_lossy(&body).into_owned();

    let payload: IncomingApplicationPayload = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(e) => {
            // A sender cannot fix a malformed payload by retrying, so this is
            // reported in the body, never as a retry-triggering status code.
            let message = format!("Malformed payload: {e}");
            let entry = NewLogEntry {
                delivery_id: String::new(),
                applicant_name: String::new(),
                applicant_email: String::new(),
                external_job_id: String::new(),
                external_job_title: String::new(),
                status: LogStatus::Error,
                application_id: None,
                error_message: Some(message.clone()),
                raw_payload: audit::truncate_payload(&raw, state.config.payload_log_max_chars),
                received_at: Utc::now(),
            };
            audit::append_best_effort(&state.db, &entry).await;
            return Json(WebhookResponse {
                success: false,
                application_id: None,
                status: None,
                error: Some(message),
            })
            .into_response();
        }
    };

    let result = state.intake.process(&raw, &payload).await;
    Json(WebhookResponse::from(result)).into_response()
}

/// GET /webhook-intake — liveness probe for the board's endpoint check.
pub async fn handle_webhook_info() -> Json<serde_json::Value> {
    Json(json!({
        "service": "camber-webhook-intake",
        "accepts": "POST application/json",
        "signature_header": SIGNATURE_HEADER,
    }))
}

#[derive(Debug, Deserialize)]
pub struct RecentLogsQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

/// GET /api/v1/webhook-logs
pub async fn handle_recent_logs(
    State(state): State<AppState>,
    Query(params): Query<RecentLogsQuery>,
) -> Result<Json<Vec<WebhookLogRow>>, AppError> {
    let logs = audit::recent(&state.db, params.limit)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(logs))
}

/// GET /api/v1/webhook-logs/stats
pub async fn handle_log_stats(
    State(state): State<AppState>,
) -> Result<Json<WebhookLogStats>, AppError> {
    let stats = audit::stats(&state.db).await.map_err(AppError::Internal)?;
    Ok(Json(stats))
}

/// GET /api/v1/webhook-logs/:delivery_id
pub async fn handle_logs_by_delivery(
    State(state): State<AppState>,
    Path(delivery_id): Path<String>,
) -> Result<Json<Vec<WebhookLogRow>>, AppError> {
    let logs = audit::by_delivery_id(&state.db, &delivery_id)
        .await
        .map_err(AppError::Internal)?;
    if logs.is_empty() {
        return Err(AppError::NotFound(format!(
            "No deliveries recorded for id '{delivery_id}'"
        )));
    }
    Ok(Json(logs))
}

/// GET /api/v1/applications/:id — triage view; the audit log links here via
/// `application_id`.
pub async fn handle_get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApplicationRow>, AppError> {
    let application: Option<ApplicationRow> =
        sqlx::query_as("SELECT * FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&state.db)
            .await?;
    application
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_result_serializes_camel_case() {
        let id = Uuid::new_v4();
        let body = serde_json::to_value(WebhookResponse::from(IntakeResult {
            outcome: IntakeOutcome::Success,
            application_id: Some(id),
            status: Some("scored".to_string()),
            error: None,
        }))
        .unwrap();
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["applicationId"], json!(id.to_string()));
        assert_eq!(body["status"], json!("scored"));
        assert!(body.get("error").is_none());
    }

    #[test]
    fn test_duplicate_is_success_shaped() {
        let body = serde_json::to_value(WebhookResponse::from(IntakeResult {
            outcome: IntakeOutcome::Duplicate,
            application_id: Some(Uuid::new_v4()),
            status: Some("duplicate".to_string()),
            error: None,
        }))
        .unwrap();
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["status"], json!("duplicate"));
    }

    #[test]
    fn test_downstream_failure_reports_error_in_body() {
        let body = serde_json::to_value(WebhookResponse::from(IntakeResult {
            outcome: IntakeOutcome::Error,
            application_id: None,
            status: None,
            error: Some("matcher unavailable".to_string()),
        }))
        .unwrap();
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"], json!("matcher unavailable"));
        assert!(body.get("applicationId").is_none());
    }
}

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::intake::audit::{self, LogStatus, NewLogEntry};
use crate::intake::extract;
use crate::intake::payload::IncomingApplicationPayload;
use crate::intake::repo::{IntakeRepo, NewApplication};
use crate::intake::storage::{store_best_effort, ResumeStore};
use crate::matcher::{JobMatcher, MatchRequest};

/// Status a claimed application row starts in. Rows stuck here with an
/// `error` log entry are candidates for operator-driven rescoring.
const STATUS_RECEIVED: &str = "received";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeOutcome {
    Success,
    Duplicate,
    Error,
}

/// What the HTTP layer serializes. Always success-shaped from the sender's
/// point of view; `Error` here means a degraded body, not a retry-triggering
/// status code.
#[derive(Debug, Clone)]
pub struct IntakeResult {
    pub outcome: IntakeOutcome,
    pub application_id: Option<Uuid>,
    pub status: Option<String>,
    pub error: Option<String>,
}

enum Processed {
    Created { id: Uuid, status: String },
    Duplicate { id: Uuid },
    MatcherFailed { id: Uuid, message: String },
}

/// Orchestrates one webhook delivery end to end: extraction, best-effort
/// storage, the atomic idempotency claim, downstream scoring and the audit
/// log entry. Collaborators are injected at construction so tests can swap
/// in doubles.
pub struct IntakeCoordinator {
    repo: Arc<dyn IntakeRepo>,
    store: Arc<dyn ResumeStore>,
    matcher: Arc<dyn JobMatcher>,
    payload_log_max_chars: usize,
    storage_timeout: Duration,
}

impl IntakeCoordinator {
    pub fn new(
        repo: Arc<dyn IntakeRepo>,
        store: Arc<dyn ResumeStore>,
        matcher: Arc<dyn JobMatcher>,
        payload_log_max_chars: usize,
        storage_timeout: Duration,
    ) -> Self {
        Self {
            repo,
            store,
            matcher,
            payload_log_max_chars,
            storage_timeout,
        }
    }

    /// Processes one delivery. Never returns an error: every failure below
    /// the transport boundary is folded into the result and the audit log,
    /// and even the audit write is allowed to fail silently.
    pub async fn process(
        &self,
        raw_body: &str,
        payload: &IncomingApplicationPayload,
    ) -> IntakeResult {
        let received_at = Utc::now();
        let truncated = audit::truncate_payload(raw_body, self.payload_log_max_chars);

        let mut entry = NewLogEntry {
            delivery_id: payload.delivery_id().unwrap_or("").to_string(),
            applicant_name: payload.applicant_name().to_string(),
            applicant_email: payload.applicant_email().to_string(),
            external_job_id: payload.external_job_id().to_string(),
            external_job_title: payload.external_job_title().to_string(),
            status: LogStatus::Error,
            application_id: None,
            error_message: None,
            raw_payload: truncated.clone(),
            received_at,
        };

        let result = match self.run(payload, &truncated, received_at).await {
            Ok(Processed::Created { id, status }) => {
                info!(application_id = %id, "Webhook application created");
                entry.status = LogStatus::Success;
                entry.application_id = Some(id);
                IntakeResult {
                    outcome: IntakeOutcome::Success,
                    application_id: Some(id),
                    status: Some(status),
                    error: None,
                }
            }
            Ok(Processed::Duplicate { id }) => {
                info!(application_id = %id, "Duplicate delivery, reusing existing application");
                entry.status = LogStatus::Duplicate;
                entry.application_id = Some(id);
                IntakeResult {
                    outcome: IntakeOutcome::Duplicate,
                    application_id: Some(id),
                    status: Some("duplicate".to_string()),
                    error: None,
                }
            }
            Ok(Processed::MatcherFailed { id, message }) => {
                error!(application_id = %id, "Candidate scoring failed: {message}");
                entry.status = LogStatus::Error;
                entry.application_id = Some(id);
                entry.error_message = Some(message.clone());
                IntakeResult {
                    outcome: IntakeOutcome::Error,
                    application_id: Some(id),
                    status: Some(STATUS_RECEIVED.to_string()),
                    error: Some(message),
                }
            }
            Err(e) => {
                let message = format!("{e:#}");
                error!("Webhook intake failed: {message}");
                entry.error_message = Some(message.clone());
                IntakeResult {
                    outcome: IntakeOutcome::Error,
                    application_id: None,
                    status: None,
                    error: Some(message),
                }
            }
        };

        // Observability must never take down the response path.
        if let Err(e) = self.repo.append_log(&entry).await {
            warn!(
                delivery_id = %entry.delivery_id,
                "Failed to write webhook log entry: {e}"
            );
        }
        result
    }

    async fn run(
        &self,
        payload: &IncomingApplicationPayload,
        truncated_payload: &str,
        received_at: DateTime<Utc>,
    ) -> Result<Processed> {
        let resume = extract::acquire(payload);
        let s3_key = store_best_effort(self.store.as_ref(), &resume, self.storage_timeout).await;

        let new = NewApplication {
            id: Uuid::new_v4(),
            external_delivery_id: payload.delivery_id().map(str::to_string),
            candidate_name: payload.applicant_name().to_string(),
            candidate_email: payload.applicant_email().to_string(),
            candidate_phone: payload.applicant_phone().to_string(),
            resume_text: resume.text.clone(),
            resume_s3_key: s3_key.clone(),
            external_job_id: payload.external_job_id().to_string(),
            external_job_title: payload.external_job_title().to_string(),
            received_at,
        };

        let application_id = match self.repo.claim_application(&new).await? {
            Some(id) => id,
            None => {
                // Lost the claim; scoring is not idempotent and must not be
                // repeated for a redelivery.
                let existing = self
                    .repo
                    .application_for_delivery(new.external_delivery_id.as_deref().unwrap_or(""))
                    .await?;
                return Ok(Processed::Duplicate { id: existing });
            }
        };

        let mapping = self
            .repo
            .resolve_mapping(payload.external_job_id())
            .await
            .unwrap_or_else(|e| {
                error!("Job mapping lookup failed, scoring against external title: {e}");
                None
            });

        let request = MatchRequest {
            delivery_id: payload.delivery_id().map(str::to_string),
            name: payload.applicant_name().to_string(),
            email: payload.applicant_email().to_string(),
            phone: payload.applicant_phone().to_string(),
            resume_text: resume.text.clone(),
            resume_s3_key: s3_key.clone(),
            external_job_id: payload.external_job_id().to_string(),
            external_job_title: payload.external_job_title().to_string(),
            internal_job_id: mapping.as_ref().map(|m| m.internal_job_id),
            internal_job_title: mapping.map(|m| m.title),
            raw_payload: truncated_payload.to_string(),
            received_at,
        };

        let scored = match self.matcher.score(&request).await {
            Ok(s) => s,
            Err(e) => {
                return Ok(Processed::MatcherFailed {
                    id: application_id,
                    message: e.to_string(),
                })
            }
        };

        self.repo
            .attach_match(
                application_id,
                scored.score,
                scored.summary.as_deref(),
                request.internal_job_id,
                &scored.status,
            )
            .await?;

        Ok(Processed::Created {
            id: application_id,
            status: scored.status,
        })
    }
}

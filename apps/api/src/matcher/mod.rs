/// Client for the candidate-scoring service.
///
/// The scoring engine (an AI service operated separately) receives the
/// normalized submission and returns a match score against the resolved job.
/// All scoring calls go through this module; no handler talks to the service
/// directly. Calls are single-attempt with a bounded timeout: scoring is
/// neither idempotent nor cheap, so transport-level retries are wrong here —
/// a failed call surfaces as a degraded intake result instead.
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum MatcherError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Matcher error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Everything the scoring service needs to evaluate one submission.
#[derive(Debug, Clone, Serialize)]
pub struct MatchRequest {
    pub delivery_id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub resume_text: String,
    pub resume_s3_key: Option<String>,
    pub external_job_id: String,
    pub external_job_title: String,
    /// Resolved internal job, when a mapping exists. Absent means the scorer
    /// falls back to the external title as free text.
    pub internal_job_id: Option<Uuid>,
    pub internal_job_title: Option<String>,
    /// Size-capped copy of the raw webhook body, for the scorer's audit trail.
    pub raw_payload: String,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchResponse {
    pub score: f64,
    pub status: String,
    pub summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MatcherApiError {
    error: Option<String>,
}

#[async_trait]
pub trait JobMatcher: Send + Sync {
    async fn score(&self, request: &MatchRequest) -> Result<MatchResponse, MatcherError>;
}

#[derive(Clone)]
pub struct MatcherClient {
    client: Client,
    url: String,
    api_key: String,
}

impl MatcherClient {
    pub fn new(url: String, api_key: String, timeout: std::time::Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            url,
            api_key,
        })
    }
}

#[async_trait]
impl JobMatcher for MatcherClient {
    async fn score(&self, request: &MatchRequest) -> Result<MatchResponse, MatcherError> {
        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<MatcherApiError>(&body)
                .ok()
                .and_then(|e| e.error)
                .unwrap_or(body);
            return Err(MatcherError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let scored: MatchResponse = response.json().await?;
        debug!(
            score = scored.score,
            status = %scored.status,
            "Matcher call succeeded"
        );
        Ok(scored)
    }
}

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use tracing::{info, warn};
use uuid::Uuid;

use crate::intake::extract::ExtractedResume;

/// Object store for raw resume files. Production uses S3/MinIO; tests inject
/// doubles through this seam.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;
}

pub struct S3ResumeStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ResumeStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ResumeStore for S3ResumeStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("S3 upload failed: {e}"))?;
        info!("Stored resume at s3://{}/{}", self.bucket, key);
        Ok(())
    }
}

/// Uploads the resume's raw bytes, returning the object key as the storage
/// handle. Best-effort: timeouts and upload failures degrade to `None` with
/// a warning, so the application can still be created text-only. Returns
/// `None` immediately when the payload carried no file.
pub async fn store_best_effort(
    store: &dyn ResumeStore,
    resume: &ExtractedResume,
    timeout: Duration,
) -> Option<String> {
    let bytes = resume.raw_bytes.as_ref()?;
    let key = format!("resumes/{}/{}", Uuid::new_v4(), sanitize(&resume.file_name));

    match tokio::time::timeout(timeout, store.put(&key, bytes.clone(), &resume.content_type)).await
    {
        Ok(Ok(())) => Some(key),
        Ok(Err(e)) => {
            warn!("Resume upload failed, continuing without stored file: {e}");
            None
        }
        Err(_) => {
            warn!("Resume upload timed out after {timeout:?}, continuing without stored file");
            None
        }
    }
}

/// Keeps object keys flat and predictable regardless of what the sender
/// claims the file is called.
fn sanitize(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "resume.pdf".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStore;

    #[async_trait]
    impl ResumeStore for FailingStore {
        async fn put(&self, _key: &str, _bytes: Vec<u8>, _content_type: &str) -> Result<()> {
            anyhow::bail!("bucket unavailable")
        }
    }

    struct OkStore;

    #[async_trait]
    impl ResumeStore for OkStore {
        async fn put(&self, _key: &str, _bytes: Vec<u8>, _content_type: &str) -> Result<()> {
            Ok(())
        }
    }

    fn resume(bytes: Option<Vec<u8>>) -> ExtractedResume {
        ExtractedResume {
            text: "text".to_string(),
            raw_bytes: bytes,
            file_name: "Jane Doe CV (final).pdf".to_string(),
            content_type: "application/pdf".to_string(),
        }
    }

    #[tokio::test]
    async fn test_upload_failure_degrades_to_none() {
        let handle =
            store_best_effort(&FailingStore, &resume(Some(vec![1, 2])), Duration::from_secs(5))
                .await;
        assert!(handle.is_none());
    }

    #[tokio::test]
    async fn test_successful_upload_returns_key() {
        let handle =
            store_best_effort(&OkStore, &resume(Some(vec![1, 2])), Duration::from_secs(5)).await;
        let key = handle.unwrap();
        assert!(key.starts_with("resumes/"));
        assert!(key.ends_with("Jane_Doe_CV__final_.pdf"));
    }

    #[tokio::test]
    async fn test_no_bytes_means_no_upload() {
        let handle = store_best_effort(&OkStore, &resume(None), Duration::from_secs(5)).await;
        assert!(handle.is_none());
    }

    #[test]
    fn test_sanitize_empty_name() {
        assert_eq!(sanitize(""), "resume.pdf");
    }
}

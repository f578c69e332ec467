use serde::Deserialize;

/// The job board's webhook payload, decoded once at the transport boundary.
///
/// Every field is optional: the sender populates them inconsistently across
/// board versions and locales, so absence is always defaulted downstream,
/// never treated as an error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncomingApplicationPayload {
    /// Opaque per-event id issued by the board; the idempotency key.
    pub delivery_id: Option<String>,
    // Locale and screening answers are decoded for shape-validation but only
    // reach downstream consumers through the raw payload copy in the audit
    // log and match request.
    #[allow(dead_code)]
    pub locale: Option<String>,
    pub job: Option<JobDescriptor>,
    pub applicant: Option<ApplicantDescriptor>,
    #[allow(dead_code)]
    pub questions: Option<Vec<QuestionAnswer>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobDescriptor {
    pub id: Option<String>,
    pub title: Option<String>,
    #[allow(dead_code)]
    pub company: Option<String>,
    #[allow(dead_code)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicantDescriptor {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub resume: Option<ResumeDescriptor>,
}

/// The resume sub-object carries either an inline file, pre-extracted
/// text/markup, or nothing at all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResumeDescriptor {
    pub file: Option<FileDescriptor>,
    pub text: Option<String>,
    pub html: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileDescriptor {
    /// Base64-encoded file bytes.
    pub data: Option<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionAnswer {
    #[allow(dead_code)]
    pub question: Option<String>,
    #[allow(dead_code)]
    pub answer: Option<String>,
}

impl IncomingApplicationPayload {
    /// Delivery id with surrounding whitespace stripped; `None` when the
    /// sender omitted it or sent an empty string. An empty id must not be
    /// used as a dedup key (it would collapse unrelated deliveries).
    pub fn delivery_id(&self) -> Option<&str> {
        self.delivery_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn applicant_name(&self) -> &str {
        field(self.applicant.as_ref().and_then(|a| a.name.as_deref()))
    }

    pub fn applicant_email(&self) -> &str {
        field(self.applicant.as_ref().and_then(|a| a.email.as_deref()))
    }

    pub fn applicant_phone(&self) -> &str {
        field(self.applicant.as_ref().and_then(|a| a.phone.as_deref()))
    }

    pub fn external_job_id(&self) -> &str {
        field(self.job.as_ref().and_then(|j| j.id.as_deref()))
    }

    pub fn external_job_title(&self) -> &str {
        field(self.job.as_ref().and_then(|j| j.title.as_deref()))
    }

    pub fn resume(&self) -> Option<&ResumeDescriptor> {
        self.applicant.as_ref().and_then(|a| a.resume.as_ref())
    }
}

fn field(value: Option<&str>) -> &str {
    value.unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_decodes_with_all_defaults() {
        let payload: IncomingApplicationPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.delivery_id().is_none());
        assert_eq!(payload.applicant_name(), "");
        assert_eq!(payload.external_job_id(), "");
        assert!(payload.resume().is_none());
    }

    #[test]
    fn test_blank_delivery_id_is_treated_as_absent() {
        let payload: IncomingApplicationPayload =
            serde_json::from_str(r#"{"delivery_id": "   "}"#).unwrap();
        assert!(payload.delivery_id().is_none());
    }

    #[test]
    fn test_nested_fields_are_surfaced() {
        let payload: IncomingApplicationPayload = serde_json::from_str(
            r#"{
                "delivery_id": "dlv-42",
                "job": {"id": "ext-7", "title": "Forklift Operator"},
                "applicant": {"name": "Jane Doe", "email": "jane@x.com", "phone": "555-0100"}
            }"#,
        )
        .unwrap();
        assert_eq!(payload.delivery_id(), Some("dlv-42"));
        assert_eq!(payload.external_job_id(), "ext-7");
        assert_eq!(payload.external_job_title(), "Forklift Operator");
        assert_eq!(payload.applicant_name(), "Jane Doe");
        assert_eq!(payload.applicant_phone(), "555-0100");
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let payload: IncomingApplicationPayload =
            serde_json::from_str(r#"{"delivery_id": "d1", "source": "board-v3"}"#).unwrap();
        assert_eq!(payload.delivery_id(), Some("d1"));
    }
}

use base64::Engine;
use tracing::{debug, warn};

use crate::intake::payload::IncomingApplicationPayload;

const DEFAULT_FILE_NAME: &str = "resume.pdf";
const DEFAULT_CONTENT_TYPE: &str = "application/pdf";

/// Resume text derived from a webhook payload.
///
/// `text` is never empty: when no usable source exists it is synthesized from
/// the applicant's identity fields. `raw_bytes` is kept whenever the payload
/// carried an inline file, even if text extraction from it failed, so the
/// original document can still be stored.
#[derive(Debug, Clone)]
pub struct ExtractedResume {
    pub text: String,
    pub raw_bytes: Option<Vec<u8>>,
    pub file_name: String,
    pub content_type: String,
}

/// Inline file decoded from the payload's base64 field.
struct InlineFile {
    bytes: Vec<u8>,
    file_name: String,
    content_type: String,
}

/// One step of the fallback chain. Strategies are tried in order; the first
/// one producing non-empty text wins. Adding or reordering a strategy is an
/// edit to `STRATEGIES`, not to control flow.
type Strategy = fn(&IncomingApplicationPayload, Option<&InlineFile>) -> Option<String>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("inline_file", inline_file_text),
    ("pre_extracted", pre_extracted_text),
];

/// Produces resume text for a payload. Infallible: decode and extraction
/// errors fall through to the next strategy, and synthesis guarantees a
/// non-empty result.
pub fn acquire(payload: &IncomingApplicationPayload) -> ExtractedResume {
    let file = decode_inline_file(payload);

    let mut text = None;
    for (name, strategy) in STRATEGIES {
        if let Some(t) = strategy(payload, file.as_ref()) {
            debug!(strategy = %name, chars = t.len(), "Resume text acquired");
            text = Some(t);
            break;
        }
    }
    let text = text.unwrap_or_else(|| synthesize_text(payload));

    match file {
        Some(f) => ExtractedResume {
            text,
            raw_bytes: Some(f.bytes),
            file_name: f.file_name,
            content_type: f.content_type,
        },
        None => ExtractedResume {
            text,
            raw_bytes: None,
            file_name: DEFAULT_FILE_NAME.to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        },
    }
}

fn decode_inline_file(payload: &IncomingApplicationPayload) -> Option<InlineFile> {
    let file = payload.resume()?.file.as_ref()?;
    let data = file.data.as_deref()?;

    match base64::engine::general_purpose::STANDARD.decode(data.trim()) {
        Ok(bytes) if !bytes.is_empty() => Some(InlineFile {
            bytes,
            file_name: file
                .file_name
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string()),
            content_type: file
                .content_type
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        }),
        Ok(_) => None,
        Err(e) => {
            warn!("Inline resume file is not valid base64: {e}");
            None
        }
    }
}

/// Strategy 1: text extracted from the inline file, assumed to be a PDF.
/// Unparsable files are logged and skipped, never fatal.
fn inline_file_text(_payload: &IncomingApplicationPayload, file: Option<&InlineFile>) -> Option<String> {
    let file = file?;
    match pdf_extract::extract_text_from_mem(&file.bytes) {
        Ok(text) => non_empty(text),
        Err(e) => {
            warn!(file_name = %file.file_name, "PDF text extraction failed: {e}");
            None
        }
    }
}

/// Strategy 2: text the board already extracted on its side, used verbatim.
/// Falls back to tag-stripped HTML when only markup was sent.
fn pre_extracted_text(payload: &IncomingApplicationPayload, _file: Option<&InlineFile>) -> Option<String> {
    let resume = payload.resume()?;
    if let Some(text) = resume.text.as_deref().and_then(|t| non_empty(t.to_string())) {
        return Some(text);
    }
    resume
        .html
        .as_deref()
        .and_then(|h| non_empty(strip_tags(h)))
}

/// Last resort: a minimal text block built from whatever identity fields are
/// present, so downstream scoring always receives non-empty input.
fn synthesize_text(payload: &IncomingApplicationPayload) -> String {
    let mut lines = vec!["Application received without resume document.".to_string()];
    for (label, value) in [
        ("Name", payload.applicant_name()),
        ("Email", payload.applicant_email()),
        ("Phone", payload.applicant_phone()),
    ] {
        if !value.is_empty() {
            lines.push(format!("{label}: {value}"));
        }
    }
    lines.join("\n")
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Drops HTML tags, keeping text content. Crude on purpose: the board's
/// markup is simple and the result only feeds keyword scoring.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                out.push(' ');
            }
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::payload::IncomingApplicationPayload;

    fn payload(json: &str) -> IncomingApplicationPayload {
        serde_json::from_str(json).unwrap()
    }

    /// Builds a single-page PDF with one text object, computing the xref
    /// offsets from the assembled bytes so the file is well-formed.
    fn minimal_pdf(text: &str) -> Vec<u8> {
        let content = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>"
                .to_string(),
            format!("<< /Length {} >>\nstream\n{content}\nendstream", content.len()),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ];

        let mut pdf = String::from("%PDF-1.4\n");
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.push_str(&format!("{} 0 obj\n{body}\nendobj\n", i + 1));
        }
        let xref_at = pdf.len();
        pdf.push_str(&format!("xref\n0 {}\n", objects.len() + 1));
        pdf.push_str("0000000000 65535 f \n");
        for offset in offsets {
            pdf.push_str(&format!("{offset:010} 00000 n \n"));
        }
        pdf.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF",
            objects.len() + 1
        ));
        pdf.into_bytes()
    }

    #[test]
    fn test_successful_pdf_extraction_wins_over_board_text() {
        let pdf_b64 = base64::engine::general_purpose::STANDARD
            .encode(minimal_pdf("Forklift certified since 2015"));
        let json = format!(
            r#"{{"applicant": {{"resume": {{
                "file": {{"data": "{pdf_b64}", "file_name": "cv.pdf"}},
                "text": "board text"
            }}}}}}"#
        );
        let resume = acquire(&payload(&json));
        assert!(resume.text.contains("Forklift certified since 2015"));
        assert_ne!(resume.text, "board text");
        assert!(resume.raw_bytes.is_some());
    }

    #[test]
    fn test_pre_extracted_text_used_verbatim() {
        let p = payload(
            r#"{"applicant": {"resume": {"text": "10 years of warehouse experience"}}}"#,
        );
        let resume = acquire(&p);
        assert_eq!(resume.text, "10 years of warehouse experience");
        assert!(resume.raw_bytes.is_none());
    }

    #[test]
    fn test_html_is_tag_stripped_when_no_text() {
        let p = payload(
            r#"{"applicant": {"resume": {"html": "<p>Certified <b>forklift</b> operator</p>"}}}"#,
        );
        let resume = acquire(&p);
        assert_eq!(resume.text, "Certified forklift operator");
    }

    #[test]
    fn test_synthesis_contains_identity_fields() {
        let p = payload(
            r#"{"applicant": {"name": "Jane Doe", "email": "jane@x.com", "phone": "555-0100"}}"#,
        );
        let resume = acquire(&p);
        assert!(resume.text.contains("Jane Doe"));
        assert!(resume.text.contains("jane@x.com"));
        assert!(resume.text.contains("555-0100"));
    }

    #[test]
    fn test_synthesis_is_never_empty_even_without_identity() {
        let resume = acquire(&payload("{}"));
        assert!(!resume.text.trim().is_empty());
    }

    #[test]
    fn test_unparsable_file_keeps_bytes_and_falls_through() {
        // Valid base64 of bytes that are not a PDF; extraction fails but the
        // raw bytes must survive for storage, and text falls back.
        let garbage_b64 = base64::engine::general_purpose::STANDARD.encode(b"not a pdf");
        let json = format!(
            r#"{{"applicant": {{
                "name": "Jane Doe",
                "resume": {{
                    "file": {{"data": "{garbage_b64}", "file_name": "cv.pdf"}},
                    "text": "fallback text from board"
                }}
            }}}}"#
        );
        let resume = acquire(&payload(&json));
        assert_eq!(resume.text, "fallback text from board");
        assert_eq!(resume.raw_bytes.as_deref(), Some(b"not a pdf".as_slice()));
        assert_eq!(resume.file_name, "cv.pdf");
    }

    #[test]
    fn test_invalid_base64_degrades_to_synthesis() {
        let p = payload(
            r#"{"applicant": {
                "name": "Jo",
                "resume": {"file": {"data": "%%%not-base64%%%"}}
            }}"#,
        );
        let resume = acquire(&p);
        assert!(resume.raw_bytes.is_none());
        assert!(resume.text.contains("Jo"));
    }

    #[test]
    fn test_strip_tags_collapses_whitespace() {
        assert_eq!(strip_tags("<div>a</div>\n<div>b</div>"), "a b");
    }
}

//! Resume extraction pipeline.
//!
//! Received → Routed → TextExtracted → QualityChecked → ModelInvoked →
//! {FieldsFromModel | FieldsFromFallback} → Returned.
//!
//! Early exits: unsupported format after routing, insufficient text at the
//! quality gate, unavailable model at invocation. An unparsable model reply
//! is never an exit; it routes to the regex fallback.

pub mod fallback;
pub mod handlers;
pub mod prompts;
pub mod reply;

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::errors::ExtractionError;
use crate::extraction::{self, text_length, DocumentFormat};
use crate::llm_client::{CompletionClient, LlmError};
use crate::models::candidate::CandidateFields;
use crate::models::document::UploadedDocument;
use crate::resume::prompts::{build_prompt, system_prompt};
use crate::resume::reply::{interpret_reply, ModelReply};

/// Roughly enough characters for a name and an email address.
pub const DEFAULT_MIN_TEXT_LENGTH: usize = 20;
/// Covers the contact block of a one-to-two page resume.
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 6000;

/// Where the returned fields came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    Model,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub format: DocumentFormat,
    pub fields: CandidateFields,
    pub source: FieldSource,
}

/// Stateless per request; clone freely and share across tasks.
#[derive(Clone)]
pub struct ResumeParser {
    llm: Arc<dyn CompletionClient>,
    min_text_length: usize,
    max_prompt_chars: usize,
}

impl ResumeParser {
    pub fn new(
        llm: Arc<dyn CompletionClient>,
        min_text_length: usize,
        max_prompt_chars: usize,
    ) -> Self {
        Self {
            llm,
            min_text_length,
            max_prompt_chars,
        }
    }

    /// Runs one document through the whole pipeline.
    pub async fn parse(&self, document: UploadedDocument) -> Result<ParseOutcome, ExtractionError> {
        let format = extraction::route(&document.file_name, &document.content_type)?;
        debug!(format = format.label(), bytes = document.bytes.len(), "Document routed");

        let text = self.extract_text(format, document.bytes).await?;
        self.check_quality(&text)?;
        debug!(chars = text_length(&text), "Extracted text passed quality gate");

        let (fields, source) = self.extract_fields(&text).await?;
        if fields.is_empty() {
            info!("No candidate fields found in extracted text");
        }

        Ok(ParseOutcome {
            format,
            fields,
            source,
        })
    }

    /// Extraction is CPU-bound, so it runs on the blocking pool.
    async fn extract_text(
        &self,
        format: DocumentFormat,
        bytes: Bytes,
    ) -> Result<String, ExtractionError> {
        let min_text_length = self.min_text_length;
        tokio::task::spawn_blocking(move || {
            extraction::extract_text(format, &bytes, min_text_length)
        })
        .await
        .map_err(|e| ExtractionError::ExtractionFailed {
            format: format.label(),
            message: format!("extractor aborted: {e}"),
        })?
    }

    fn check_quality(&self, text: &str) -> Result<(), ExtractionError> {
        let found = text_length(text);
        if found < self.min_text_length {
            return Err(ExtractionError::InsufficientText {
                found,
                required: self.min_text_length,
            });
        }
        Ok(())
    }

    /// Model first; an unusable reply degrades to the regex fallback.
    pub async fn extract_fields(
        &self,
        text: &str,
    ) -> Result<(CandidateFields, FieldSource), ExtractionError> {
        let prompt = build_prompt(text, self.max_prompt_chars);

        let raw = match self.llm.complete(&prompt, &system_prompt()).await {
            Ok(raw) => raw,
            Err(LlmError::EmptyContent) => String::new(),
            Err(e) => return Err(ExtractionError::ModelUnavailable(e.to_string())),
        };

        match interpret_reply(&raw) {
            ModelReply::Fields(fields) => Ok((fields, FieldSource::Model)),
            ModelReply::Reported(message) => Err(ExtractionError::ModelResponseInvalid(message)),
            ModelReply::Unusable(reason) => {
                warn!("Model reply unusable ({reason}); using pattern fallback");
                Ok((fallback::extract_fields(text), FieldSource::Fallback))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::llm_client::LlmClient;

    pub(crate) enum MockBehavior {
        Reply(String),
        Empty,
        Down,
    }

    /// Completion double that counts calls and remembers the last prompt.
    pub(crate) struct MockCompletion {
        behavior: MockBehavior,
        calls: AtomicUsize,
        last_prompt: Mutex<Option<String>>,
    }

    impl MockCompletion {
        pub(crate) fn new(behavior: MockBehavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            })
        }

        pub(crate) fn replying(reply: &str) -> Arc<Self> {
            Self::new(MockBehavior::Reply(reply.to_string()))
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_prompt(&self) -> Option<String> {
            self.last_prompt.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionClient for MockCompletion {
        async fn complete(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            match &self.behavior {
                MockBehavior::Reply(reply) => Ok(reply.clone()),
                MockBehavior::Empty => Err(LlmError::EmptyContent),
                MockBehavior::Down => Err(LlmError::Api {
                    status: 529,
                    message: "overloaded".to_string(),
                }),
            }
        }
    }

    const RESUME_TEXT: &str = "John Smith\njohn@example.com\n(415) 555-0100";
    const MODEL_JSON: &str =
        r#"{"full_name":"John Smith","email":"john@example.com","phone":"(415) 555-0100"}"#;

    fn parser(llm: Arc<dyn CompletionClient>) -> ResumeParser {
        ResumeParser::new(llm, DEFAULT_MIN_TEXT_LENGTH, DEFAULT_MAX_PROMPT_CHARS)
    }

    fn txt(content: &str) -> UploadedDocument {
        UploadedDocument::new(content.as_bytes().to_vec(), "resume.txt", "text/plain")
    }

    fn john_smith() -> CandidateFields {
        CandidateFields {
            full_name: Some("John Smith".to_string()),
            email: Some("john@example.com".to_string()),
            phone: Some("(415) 555-0100".to_string()),
        }
    }

    #[tokio::test]
    async fn test_model_fields_are_returned() {
        let llm = MockCompletion::replying(MODEL_JSON);
        let outcome = parser(llm.clone()).parse(txt(RESUME_TEXT)).await.unwrap();
        assert_eq!(outcome.fields, john_smith());
        assert_eq!(outcome.source, FieldSource::Model);
        assert_eq!(outcome.format, DocumentFormat::PlainText);
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_short_text_never_reaches_model() {
        let llm = MockCompletion::replying(MODEL_JSON);
        let err = parser(llm.clone()).parse(txt("hi")).await.unwrap_err();
        assert_eq!(
            err,
            ExtractionError::InsufficientText {
                found: 2,
                required: DEFAULT_MIN_TEXT_LENGTH
            }
        );
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_whitespace_padding_does_not_pass_gate() {
        let llm = MockCompletion::replying(MODEL_JSON);
        let padded = format!("{}hi{}", " ".repeat(40), "\n".repeat(40));
        let err = parser(llm.clone()).parse(txt(&padded)).await.unwrap_err();
        assert!(matches!(err, ExtractionError::InsufficientText { .. }));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_format_never_reaches_model() {
        let llm = MockCompletion::replying(MODEL_JSON);
        let doc = UploadedDocument::new(
            RESUME_TEXT.as_bytes().to_vec(),
            "resume.xyz",
            "application/octet-stream",
        );
        let err = parser(llm.clone()).parse(doc).await.unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat(_)));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_json_falls_back_to_patterns() {
        let llm = MockCompletion::replying("I'm sorry, I can't produce JSON today.");
        let outcome = parser(llm).parse(txt(RESUME_TEXT)).await.unwrap();
        assert_eq!(outcome.fields, john_smith());
        assert_eq!(outcome.source, FieldSource::Fallback);
    }

    #[tokio::test]
    async fn test_empty_content_falls_back_to_patterns() {
        let llm = MockCompletion::new(MockBehavior::Empty);
        let outcome = parser(llm).parse(txt(RESUME_TEXT)).await.unwrap();
        assert_eq!(outcome.fields, john_smith());
        assert_eq!(outcome.source, FieldSource::Fallback);
    }

    #[tokio::test]
    async fn test_fenced_reply_matches_plain_reply() {
        let fenced = MockCompletion::replying(
            "```json\n{\"full_name\":\"A\",\"email\":null,\"phone\":null}\n```",
        );
        let plain = MockCompletion::replying(r#"{"full_name":"A","email":null,"phone":null}"#);
        let a = parser(fenced).parse(txt(RESUME_TEXT)).await.unwrap();
        let b = parser(plain).parse(txt(RESUME_TEXT)).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.source, FieldSource::Model);
    }

    #[tokio::test]
    async fn test_identical_input_yields_identical_fields() {
        let llm = MockCompletion::replying(MODEL_JSON);
        let parser = parser(llm.clone());
        let first = parser.parse(txt(RESUME_TEXT)).await.unwrap();
        let second = parser.parse(txt(RESUME_TEXT)).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn test_endpoint_failure_is_model_unavailable() {
        let llm = MockCompletion::new(MockBehavior::Down);
        let err = parser(llm.clone()).parse(txt(RESUME_TEXT)).await.unwrap_err();
        assert!(matches!(err, ExtractionError::ModelUnavailable(_)));
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_credential_is_model_unavailable() {
        let client = LlmClient::new(None, "http://127.0.0.1:9/", Duration::from_secs(1)).unwrap();
        let err = parser(Arc::new(client))
            .parse(txt(RESUME_TEXT))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::ModelUnavailable(_)));
        assert!(err.status_code().is_server_error());
    }

    #[tokio::test]
    async fn test_model_reported_error_is_surfaced() {
        let llm = MockCompletion::replying(r#"{"error":"Document is not a resume"}"#);
        let err = parser(llm).parse(txt(RESUME_TEXT)).await.unwrap_err();
        assert_eq!(
            err,
            ExtractionError::ModelResponseInvalid("Document is not a resume".to_string())
        );
    }

    #[tokio::test]
    async fn test_prompt_is_bounded() {
        let llm = MockCompletion::replying(MODEL_JSON);
        let long_text = format!("{RESUME_TEXT}\n{}\nUNSEEN_TAIL", "x".repeat(200));
        ResumeParser::new(llm.clone(), DEFAULT_MIN_TEXT_LENGTH, 100)
            .parse(txt(&long_text))
            .await
            .unwrap();
        let prompt = llm.last_prompt().unwrap();
        assert!(prompt.contains("john@example.com"));
        assert!(!prompt.contains("UNSEEN_TAIL"));
    }

    #[tokio::test]
    async fn test_pdf_upload_runs_end_to_end() {
        let llm = MockCompletion::replying("not json");
        let pdf = b"%PDF-1.4\n1 0 obj\n<< /Length 40 >>\nstream\nJane Doe jane@example.com 555-123-4567\nendstream\nendobj\n%%EOF".to_vec();
        let doc = UploadedDocument::new(pdf, "cv.pdf", "application/pdf");
        let outcome = parser(llm).parse(doc).await.unwrap();
        assert_eq!(outcome.format, DocumentFormat::Pdf);
        assert_eq!(outcome.source, FieldSource::Fallback);
        assert_eq!(outcome.fields.email.as_deref(), Some("jane@example.com"));
        assert_eq!(outcome.fields.phone.as_deref(), Some("555-123-4567"));
        assert_eq!(outcome.fields.full_name.as_deref(), Some("Jane Doe"));
    }
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Fatal outcomes of one extraction request.
///
/// An unparsable model reply is deliberately absent: it is recovered by the
/// regex fallback and never reaches the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}. Only PDF, DOCX or TXT files are accepted.")]
    UnsupportedFormat(String),

    #[error("Failed to extract text from {format}: {message}")]
    ExtractionFailed {
        format: &'static str,
        message: String,
    },

    #[error("Could not extract enough text from resume ({found} characters, need at least {required}). Is it valid?")]
    InsufficientText { found: usize, required: usize },

    #[error("Resume extraction model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Resume extraction model reported an error: {0}")]
    ModelResponseInvalid(String),
}

impl ExtractionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ExtractionError::UnsupportedFormat(_)
            | ExtractionError::ExtractionFailed { .. }
            | ExtractionError::InsufficientText { .. } => StatusCode::BAD_REQUEST,
            ExtractionError::ModelUnavailable(_) | ExtractionError::ModelResponseInvalid(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, self.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                tracing::warn!("Upload rejected: {msg}");
                (StatusCode::PAYLOAD_TOO_LARGE, msg.clone())
            }
            AppError::Extraction(e) => {
                let status = e.status_code();
                if status.is_server_error() {
                    tracing::error!("Resume extraction failed: {e}");
                } else {
                    tracing::warn!("Resume extraction rejected: {e}");
                }
                (status, e.to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_problems_map_to_400() {
        assert_eq!(
            ExtractionError::UnsupportedFormat("xyz".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ExtractionError::InsufficientText {
                found: 2,
                required: 20
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ExtractionError::ExtractionFailed {
                format: "TXT",
                message: "bad utf-8".into()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_model_problems_map_to_500() {
        assert_eq!(
            ExtractionError::ModelUnavailable("no key".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ExtractionError::ModelResponseInvalid("nope".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_body_is_flat_error_string() {
        let response = AppError::BadRequest("Missing resume file.".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({ "error": "Missing resume file." }));
    }

    #[test]
    fn test_payload_too_large_maps_to_413() {
        let response = AppError::PayloadTooLarge("Upload exceeds the size limit.".into()).into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}

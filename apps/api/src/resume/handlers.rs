//! Axum route handlers for the resume parsing endpoint.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::candidate::CandidateFields;
use crate::models::document::UploadedDocument;
use crate::state::AppState;

/// Form field the upload is expected in.
const RESUME_FIELD: &str = "resume";

#[derive(Debug, Serialize)]
pub struct ResumeParseResponse {
    pub result: CandidateFields,
}

/// POST /resume-parse
///
/// Accepts a `multipart/form-data` upload and returns the candidate's
/// name, email and phone.
pub async fn handle_resume_parse(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ResumeParseResponse>, AppError> {
    let multipart = multipart.map_err(|e| {
        AppError::BadRequest(format!("Content-Type must be multipart/form-data ({e})"))
    })?;

    let document = read_upload(multipart)
        .await?
        .ok_or_else(|| AppError::BadRequest("Missing resume file.".to_string()))?;

    let span = info_span!(
        "resume_parse",
        request_id = %Uuid::new_v4(),
        file_name = %document.file_name,
    );
    let outcome = state
        .parser
        .parse(document)
        .instrument(span.clone())
        .await?;
    span.in_scope(|| {
        info!(
            format = outcome.format.label(),
            source = ?outcome.source,
            found = outcome.fields.found_count(),
            "Resume fields extracted"
        )
    });

    Ok(Json(ResumeParseResponse {
        result: outcome.fields,
    }))
}

/// OPTIONS /resume-parse
pub async fn handle_preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn handle_method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Takes the `resume` field, or else the first part that carries a file name.
async fn read_upload(mut multipart: Multipart) -> Result<Option<UploadedDocument>, AppError> {
    let mut first_file: Option<UploadedDocument> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error("Failed to read upload", e))?
    {
        let is_resume = field.name() == Some(RESUME_FIELD);
        if !is_resume && (first_file.is_some() || field.file_name().is_none()) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| upload_error("Failed to read file data", e))?;
        let document = UploadedDocument::new(bytes, file_name, content_type);

        if is_resume {
            return Ok(Some(document));
        }
        first_file = Some(document);
    }

    Ok(first_file)
}

/// A body cut off by `DefaultBodyLimit` surfaces here as a multipart error
/// carrying 413; everything else is a malformed request.
fn upload_error(context: &str, e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Resume file is too large ({})", e.body_text()))
    } else {
        AppError::BadRequest(format!("{context}: {e}"))
    }
}

//! Axum route handlers for the Resume API.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::resume::keywords::ResumeSummary;
use crate::resume::parser::FullResume;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub status: String,
    pub filename: String,
    pub parsed: ResumeSummary,
    pub entire_data: FullResume,
}

/// POST /api/resume/upload
///
/// Multipart form with a single `file` part. Both parses run on the blocking
/// pool and are memoized, so re-uploading the same file is cheap.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content = field.bytes().await.map_err(multipart_error)?;
            upload = Some((filename, content));
            break;
        }
    }

    let (filename, content) =
        upload.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;

    if content.len() > state.config.max_resume_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "Resume file exceeds {} byte limit",
            state.config.max_resume_bytes
        )));
    }

    info!("Processing resume: {filename} ({} bytes)", content.len());

    let parser = state.resume_parser.clone();
    let name = filename.clone();
    let (parsed, entire_data) = tokio::task::spawn_blocking(move || {
        let parsed = parser.parse_basic(&content, &name)?;
        let entire = parser.parse_full(&content, &name)?;
        Ok::<_, crate::resume::ResumeError>((parsed, entire))
    })
    .await
    .map_err(anyhow::Error::from)??;

    Ok(Json(UploadResponse {
        status: "success".into(),
        filename,
        parsed,
        entire_data,
    }))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(e.body_text())
    }
}

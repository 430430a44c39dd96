use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::reply::Failure;
use super::state::AppState;
use crate::error::SolveError;
use crate::output::{FileSolution, HealthReport, JobStatus, TextSolution};
use crate::pipeline::input::{TextSubmission, UploadedFile};

/// Multipart field carrying the question paper.
pub const FILE_FIELD: &str = "file";

/// `GET /api/health`. Always 200; the body says whether the AI answered.
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let report = state.solver.health().await;
    tracing::debug!("health: {}", report.status);
    Json(report)
}

/// `POST /api/process-text`
pub async fn process_text(
    State(state): State<AppState>,
    body: Result<Json<TextSubmission>, JsonRejection>,
) -> Result<Json<TextSolution>, Failure> {
    let Json(submission) = body.map_err(|e| Failure::bad_request(e.body_text()))?;
    let solution = state.solver.solve_text(submission).await?;
    Ok(Json(solution))
}

/// `POST /api/upload`
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<FileSolution>, Failure> {
    let mut multipart = multipart.map_err(|e| Failure::bad_request(e.body_text()))?;
    let limit = state.solver.config().max_upload_bytes;

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let media_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        files.push(UploadedFile::new(filename, media_type, bytes.to_vec()));
    }

    let solution = state.solver.solve_file(files).await?;
    Ok(Json(solution))
}

/// `GET /api/status/:job_id`
pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Json<JobStatus> {
    Json(state.solver.job_status(&job_id))
}

/// A body cut off by the transport limit reads as the oversize rejection.
fn multipart_error(err: MultipartError, limit: u64) -> SolveError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        SolveError::FileTooLarge { limit }
    } else {
        SolveError::MalformedUpload(err.body_text())
    }
}

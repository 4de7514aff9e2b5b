use std::path::{Path, PathBuf};

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use comparador_core::BatchSummary;
use serde::Serialize;
use uuid::Uuid;

use super::AppState;

const ALLOWED_EXTENSIONS: [&str; 4] = [".xlsx", ".xls", ".csv", ".tsv"];
const FALLBACK_FILE_NAME: &str = "upload";

const MSG_MISSING_FILE: &str = "No se encontró el archivo";
const MSG_BAD_FORMAT: &str = "Formato no válido. Use Excel (.xlsx, .xls) o CSV (.csv, .tsv)";
const MSG_INTERNAL: &str = "Error interno del servidor";

/// A stored upload and where its comparison can be downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct BatchJob {
    pub process_id: Uuid,
    pub download_url: String,
    pub upload_path: PathBuf,
}

impl BatchJob {
    /// Allocates a fresh job id; the download URL reuses it.
    pub(super) fn new(upload_dir: &Path, file_name: &str) -> Self {
        let process_id = Uuid::new_v4();
        Self {
            process_id,
            download_url: format!("/api/download/{process_id}"),
            upload_path: upload_dir.join(format!("{process_id}_{file_name}")),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ProcessResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    process_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<BatchSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ProcessResponse {
    fn accepted(job: &BatchJob, summary: BatchSummary) -> Self {
        Self {
            success: true,
            process_id: Some(job.process_id),
            download_url: Some(job.download_url.clone()),
            summary: Some(summary),
            error: None,
        }
    }

    fn rejected(status: StatusCode, message: impl Into<String>) -> Response {
        let body = Self {
            success: false,
            process_id: None,
            download_url: None,
            summary: None,
            error: Some(message.into()),
        };
        (status, Json(body)).into_response()
    }
}

/// Final path component of a client-supplied file name.
pub(super) fn sanitize_file_name(raw: &str) -> &str {
    raw.rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .unwrap_or(FALLBACK_FILE_NAME)
}

/// Whether the lowercased suffix from the last `.` is an accepted format.
pub(super) fn has_allowed_extension(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    lower
        .rfind('.')
        .is_some_and(|idx| ALLOWED_EXTENSIONS.contains(&&lower[idx..]))
}

fn multipart_rejection(err: &MultipartError) -> Response {
    tracing::warn!(error = %err, "unreadable multipart upload");
    ProcessResponse::rejected(StatusCode::BAD_REQUEST, err.body_text())
}

pub(super) async fn process_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let mut upload = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => {
                let file_name =
                    sanitize_file_name(field.file_name().unwrap_or_default()).to_owned();
                match field.bytes().await {
                    Ok(bytes) => {
                        upload = Some((file_name, bytes));
                        break;
                    }
                    Err(e) => return multipart_rejection(&e),
                }
            }
            Ok(Some(_)) => {}
            Ok(None) => break,
            Err(e) => return multipart_rejection(&e),
        }
    }

    let Some((file_name, bytes)) = upload else {
        return ProcessResponse::rejected(StatusCode::BAD_REQUEST, MSG_MISSING_FILE);
    };
    if !has_allowed_extension(&file_name) {
        return ProcessResponse::rejected(StatusCode::BAD_REQUEST, MSG_BAD_FORMAT);
    }

    let job = BatchJob::new(&state.config.upload_dir, &file_name);
    if let Err(e) = store_upload(&job.upload_path, &bytes).await {
        tracing::error!(
            path = %job.upload_path.display(),
            error = %e,
            "failed to store upload"
        );
        return ProcessResponse::rejected(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL);
    }
    tracing::info!(
        process_id = %job.process_id,
        file_name = %file_name,
        bytes = bytes.len(),
        "upload stored"
    );

    match state.comparisons.summarize_upload(&file_name).await {
        Ok(summary) => Json(ProcessResponse::accepted(&job, summary)).into_response(),
        Err(e) => {
            tracing::error!(
                process_id = %job.process_id,
                error = %e,
                "batch processing failed"
            );
            ProcessResponse::rejected(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL)
        }
    }
}

async fn store_upload(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(path, bytes).await
}

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Extension,
};
use comparador_export::{write_comparison, XLSX_CONTENT_TYPE};

use crate::middleware::RequestId;

use super::{ApiError, AppState};

const MAX_ID_LEN: usize = 64;

/// Ids are opaque, but they end up in a `Content-Disposition` header.
pub(super) fn is_valid_job_id(id: &str) -> bool {
    (1..=MAX_ID_LEN).contains(&id.len())
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Builds the comparison workbook for `id`.
///
/// The id is not looked up: every download gets a freshly generated
/// comparison, whether or not an upload with that id exists.
pub(super) async fn download(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    if !is_valid_job_id(&id) {
        return Err(ApiError::bad_request(req_id.0, "Invalid download id"));
    }

    let generation_failed = |reason: String| {
        tracing::error!(
            request_id = %req_id.0,
            process_id = %id,
            error = %reason,
            "download generation failed"
        );
        ApiError::new(
            req_id.0.clone(),
            "internal_error",
            "Error generating download file",
        )
    };

    let rows = state
        .comparisons
        .comparison_rows()
        .await
        .map_err(|e| generation_failed(e.to_string()))?;
    let bytes = write_comparison(&rows).map_err(|e| generation_failed(e.to_string()))?;

    tracing::info!(process_id = %id, rows = rows.len(), "comparison workbook generated");
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"comparacion_precios_{id}.xlsx\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

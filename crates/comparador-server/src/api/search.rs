use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use comparador_core::{ProductRecord, SearchMode, StoreSelection};
use comparador_export::{rows_from_results, write_search_results, XLSX_CONTENT_TYPE};
use comparador_search::StoreResults;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, AppState};

const EXPORT_FILE_NAME: &str = "resultados_busqueda.xlsx";

#[derive(Debug, Default, Deserialize)]
pub(super) struct SearchQuery {
    pub q: Option<String>,
    pub query: Option<String>,
    pub store: Option<String>,
    pub mode: Option<String>,
}

/// A validated search request.
#[derive(Debug, PartialEq, Eq)]
pub(super) struct SearchRequest {
    pub term: String,
    pub selection: StoreSelection,
    pub mode: SearchMode,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(super) enum SearchResponse {
    AllStores {
        query: String,
        results: StoreResults,
    },
    OneStore {
        query: String,
        store: &'static str,
        results: Vec<ProductRecord>,
    },
}

impl SearchQuery {
    /// Validates the raw query string parameters.
    ///
    /// `q` wins over `query`; blank values count as missing. `store` and
    /// `mode` are case-insensitive and default to `all` / `concurrent`.
    pub(super) fn validate(self, req_id: &str) -> Result<SearchRequest, ApiError> {
        let term = [self.q, self.query]
            .into_iter()
            .flatten()
            .map(|t| t.trim().to_owned())
            .find(|t| !t.is_empty())
            .ok_or_else(|| ApiError::bad_request(req_id, "Missing query parameter `q`"))?;

        let selection = match self.store.as_deref().map(str::trim) {
            None | Some("") => StoreSelection::All,
            Some(raw) => raw
                .parse::<StoreSelection>()
                .map_err(|e| ApiError::bad_request(req_id, e.to_string()))?,
        };

        let mode = match self.mode.as_deref().map(str::trim) {
            None | Some("") => SearchMode::default(),
            Some(raw) => raw
                .parse::<SearchMode>()
                .map_err(|e| ApiError::bad_request(req_id, e.to_string()))?,
        };

        Ok(SearchRequest {
            term,
            selection,
            mode,
        })
    }
}

async fn run_search(state: &AppState, request: &SearchRequest) -> StoreResults {
    state
        .aggregator
        .search(&request.term, request.selection, request.mode)
        .await
}

pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let request = query.validate(&req_id.0)?;
    let mut results = run_search(&state, &request).await;

    let response = match request.selection {
        StoreSelection::All => SearchResponse::AllStores {
            query: request.term,
            results,
        },
        StoreSelection::One(store) => SearchResponse::OneStore {
            query: request.term,
            store: store.id(),
            results: results.take(store).unwrap_or_default(),
        },
    };
    Ok(Json(response))
}

pub(super) async fn export(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, ApiError> {
    let request = query.validate(&req_id.0)?;
    let results = run_search(&state, &request).await;

    let rows = rows_from_results(&results);
    if rows.is_empty() {
        return Err(ApiError::bad_request(
            req_id.0,
            "No hay resultados para exportar",
        ));
    }

    let bytes = write_search_results(&rows).map_err(|e| {
        tracing::error!(request_id = %req_id.0, error = %e, "search export failed");
        ApiError::new(req_id.0.clone(), "internal_error", "Error generating export file")
    })?;

    tracing::info!(term = %request.term, rows = rows.len(), "search results exported");
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

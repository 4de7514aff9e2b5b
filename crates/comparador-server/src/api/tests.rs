use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use calamine::{open_workbook_from_rs, Reader, Xlsx};
use comparador_core::{BatchSummary, ComparisonRow, ProductRecord, Store};
use comparador_search::{
    CatalogError, ExtractError, MockCatalog, MockComparisons, MockLatency, StoreCatalog,
};
use tower::ServiceExt;

use super::process::{has_allowed_extension, sanitize_file_name, BatchJob};
use super::download::is_valid_job_id;
use super::*;

const BOUNDARY: &str = "comparador-test-boundary";

// -------------------------------------------------------------------------
// Fixtures
// -------------------------------------------------------------------------

struct FailingCatalog;

#[async_trait]
impl StoreCatalog for FailingCatalog {
    async fn search(&self, _: Store, _: &str) -> Result<Vec<ProductRecord>, CatalogError> {
        Err(ExtractError::EmptyArray.into())
    }

    fn label(&self) -> &'static str {
        "failing"
    }
}

struct FailingComparisons;

#[async_trait]
impl ComparisonSource for FailingComparisons {
    async fn summarize_upload(&self, _: &str) -> Result<BatchSummary, CatalogError> {
        Err(ExtractError::NoObjectFound.into())
    }

    async fn comparison_rows(&self) -> Result<Vec<ComparisonRow>, CatalogError> {
        Err(ExtractError::NoArrayFound.into())
    }
}

fn test_config(upload_dir: &Path, max_upload_bytes: usize) -> Arc<AppConfig> {
    let map: HashMap<String, String> = [
        ("COMPARADOR_MOCK_SEED", "7".to_owned()),
        ("COMPARADOR_UPLOAD_DIR", upload_dir.display().to_string()),
        ("COMPARADOR_MAX_UPLOAD_BYTES", max_upload_bytes.to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v))
    .collect();
    let config = comparador_core::build_app_config(|key| {
        map.get(key).cloned().ok_or(std::env::VarError::NotPresent)
    })
    .expect("test config should be valid");
    Arc::new(config)
}

fn mock_sources() -> Sources {
    Sources {
        catalog: Arc::new(MockCatalog::seeded(7).with_latency(MockLatency::none())),
        comparisons: Arc::new(MockComparisons::seeded(8)),
    }
}

fn app_with(sources: &Sources, upload_dir: &Path) -> Router {
    build_app(
        AppState::new(sources, test_config(upload_dir, 1024 * 1024)),
        RateLimitState::per_minute(1_000),
    )
}

fn mock_app(upload_dir: &Path) -> Router {
    app_with(&mock_sources(), upload_dir)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn multipart_upload(field_name: &str, file_name: &str, content: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field_name}\"; \
         filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/process")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request")
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes")
        .to_vec()
}

async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json parse")
}

fn header_str<'a>(response: &'a Response<Body>, name: header::HeaderName) -> &'a str {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

// -------------------------------------------------------------------------
// Helpers
// -------------------------------------------------------------------------

#[test]
fn api_error_bad_request_maps_to_400() {
    let response = ApiError::bad_request("req-1", "invalid input").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn api_error_unknown_code_maps_to_500() {
    let response = ApiError::new("req-1", "internal_error", "boom").into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn sanitize_file_name_keeps_final_component() {
    assert_eq!(sanitize_file_name("lista.xlsx"), "lista.xlsx");
    assert_eq!(sanitize_file_name("../../etc/lista.csv"), "lista.csv");
    assert_eq!(sanitize_file_name("C:\\Users\\ana\\precios.tsv"), "precios.tsv");
    assert_eq!(sanitize_file_name(""), "upload");
    assert_eq!(sanitize_file_name("dir/.."), "upload");
}

#[test]
fn allowed_extensions_are_case_insensitive() {
    assert!(has_allowed_extension("Lista.XLSX"));
    assert!(has_allowed_extension("a.b.csv"));
    assert!(has_allowed_extension("datos.tsv"));
    assert!(!has_allowed_extension("list.pdf"));
    assert!(!has_allowed_extension("xlsx"));
    assert!(!has_allowed_extension("archivo.xlsx.exe"));
}

#[test]
fn job_ids_are_restricted() {
    assert!(is_valid_job_id("abc-123"));
    assert!(is_valid_job_id("3f2b9c1e-7d4a-4b8e-9f10-1a2b3c4d5e6f"));
    assert!(is_valid_job_id("job_1"));
    assert!(!is_valid_job_id(""));
    assert!(!is_valid_job_id("bad.id"));
    assert!(!is_valid_job_id("a b"));
    assert!(!is_valid_job_id(&"x".repeat(65)));
}

#[test]
fn batch_job_download_url_reuses_process_id() {
    let job = BatchJob::new(Path::new("/tmp/uploads"), "lista.xlsx");
    assert_eq!(job.download_url, format!("/api/download/{}", job.process_id));
    assert_eq!(
        job.upload_path,
        Path::new("/tmp/uploads").join(format!("{}_lista.xlsx", job.process_id))
    );
}

// -------------------------------------------------------------------------
// Health & middleware
// -------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let response = mock_app(dir.path()).oneshot(get("/api/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!header_str(&response, HeaderName::from_static("x-request-id")).is_empty());
    let json = body_json(response).await;
    assert_eq!(json, serde_json::json!({"status": "ok", "catalog": "mock"}));
}

#[tokio::test]
async fn request_id_header_is_echoed() {
    let dir = tempfile::tempdir().unwrap();
    let request = Request::builder()
        .uri("/api/search")
        .header("x-request-id", "req-abc")
        .body(Body::empty())
        .unwrap();
    let response = mock_app(dir.path()).oneshot(request).await.unwrap();

    assert_eq!(
        header_str(&response, HeaderName::from_static("x-request-id")),
        "req-abc"
    );
    let json = body_json(response).await;
    assert_eq!(json["request_id"], "req-abc");
}

#[tokio::test]
async fn rate_limit_rejects_excess_requests() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(&mock_sources(), test_config(dir.path(), 1024));
    let app = build_app(state, RateLimitState::new(1, Duration::from_secs(60)));

    let first = app.clone().oneshot(get("/api/search?q=tv&store=gollo")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.clone().oneshot(get("/api/search?q=tv&store=gollo")).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(second).await["code"], "rate_limited");

    let health = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}

// -------------------------------------------------------------------------
// /api/search
// -------------------------------------------------------------------------

#[tokio::test]
async fn search_without_query_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let response = mock_app(dir.path()).oneshot(get("/api/search")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Missing query parameter `q`");
    assert_eq!(json["code"], "bad_request");
}

#[tokio::test]
async fn search_with_blank_query_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let response = mock_app(dir.path())
        .oneshot(get("/api/search?q=%20%20"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_accepts_query_alias() {
    let dir = tempfile::tempdir().unwrap();
    let response = mock_app(dir.path())
        .oneshot(get("/api/search?query=lavadora&store=monge"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["query"], "lavadora");
    assert_eq!(json["store"], "monge");
}

#[tokio::test]
async fn search_unknown_store_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let response = mock_app(dir.path())
        .oneshot(get("/api/search?q=tv&store=amazon"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Unknown store 'amazon'");
}

#[tokio::test]
async fn search_unknown_mode_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let response = mock_app(dir.path())
        .oneshot(get("/api/search?q=tv&mode=parallel"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_single_store_returns_records() {
    let dir = tempfile::tempdir().unwrap();
    let response = mock_app(dir.path())
        .oneshot(get("/api/search?q=iphone&store=gollo"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["query"], "iphone");
    assert_eq!(json["store"], "gollo");

    let results = json["results"].as_array().expect("results array");
    assert!((3..=5).contains(&results.len()), "got {}", results.len());
    for record in results {
        assert!(record["regular_price"].as_str().unwrap().starts_with('₡'));
        assert_eq!(record["store"], "Gollo");
        assert!(record.get("error").is_none());
    }
}

#[tokio::test]
async fn search_all_stores_returns_every_key() {
    let dir = tempfile::tempdir().unwrap();
    for mode in ["concurrent", "sequential"] {
        let response = mock_app(dir.path())
            .oneshot(get(&format!("/api/search?q=tv&store=ALL&mode={mode}")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json.get("store").is_none());
        let results = json["results"].as_object().expect("results object");
        let mut keys: Vec<_> = results.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["gollo", "mexpress", "monge"], "mode {mode}");
    }
}

#[tokio::test]
async fn search_reports_store_failures_inline() {
    let dir = tempfile::tempdir().unwrap();
    let sources = Sources {
        catalog: Arc::new(FailingCatalog),
        comparisons: Arc::new(MockComparisons::seeded(1)),
    };
    let response = app_with(&sources, dir.path())
        .oneshot(get("/api/search?q=tv"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let monge = json["results"]["monge"].as_array().unwrap();
    assert_eq!(monge.len(), 1);
    assert_eq!(monge[0]["error"]["code"], 101);
    assert_eq!(monge[0]["error"]["message"], "Respuesta inválida de Monge");
    assert_eq!(monge[0]["name"], "");
}

// -------------------------------------------------------------------------
// /api/export
// -------------------------------------------------------------------------

#[tokio::test]
async fn export_returns_workbook_attachment() {
    let dir = tempfile::tempdir().unwrap();
    let response = mock_app(dir.path())
        .oneshot(get("/api/export?q=iphone&store=mexpress"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, header::CONTENT_TYPE),
        comparador_export::XLSX_CONTENT_TYPE
    );
    assert_eq!(
        header_str(&response, header::CONTENT_DISPOSITION),
        "attachment; filename=\"resultados_busqueda.xlsx\""
    );

    let bytes = body_bytes(response).await;
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
    let range = workbook
        .worksheet_range(comparador_export::SEARCH_SHEET)
        .unwrap();
    assert!((4..=6).contains(&range.height()));
    assert_eq!(range.get_value((1, 0)).unwrap().to_string(), "MExpress");
}

#[tokio::test]
async fn export_without_results_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let sources = Sources {
        catalog: Arc::new(FailingCatalog),
        comparisons: Arc::new(MockComparisons::seeded(1)),
    };
    let response = app_with(&sources, dir.path())
        .oneshot(get("/api/export?q=tv"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "No hay resultados para exportar"
    );
}

// -------------------------------------------------------------------------
// /api/process
// -------------------------------------------------------------------------

#[tokio::test]
async fn process_rejects_unsupported_format() {
    let dir = tempfile::tempdir().unwrap();
    let response = mock_app(dir.path())
        .oneshot(multipart_upload("file", "list.pdf", b"%PDF-1.7"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(
        json["error"],
        "Formato no válido. Use Excel (.xlsx, .xls) o CSV (.csv, .tsv)"
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn process_requires_file_field() {
    let dir = tempfile::tempdir().unwrap();
    let response = mock_app(dir.path())
        .oneshot(multipart_upload("attachment", "list.csv", b"a,b"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "No se encontró el archivo");
}

#[tokio::test]
async fn process_stores_upload_and_returns_job() {
    let dir = tempfile::tempdir().unwrap();
    let response = mock_app(dir.path())
        .oneshot(multipart_upload("file", "list.xlsx", b"fake workbook"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    let process_id = json["process_id"].as_str().expect("process_id");
    assert_eq!(json["download_url"], format!("/api/download/{process_id}"));
    assert_eq!(json["summary"]["productsProcessed"], 29);
    assert!(json.get("error").is_none());

    let stored = dir.path().join(format!("{process_id}_list.xlsx"));
    assert_eq!(std::fs::read(stored).unwrap(), b"fake workbook");
}

#[tokio::test]
async fn process_strips_directories_from_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let response = mock_app(dir.path())
        .oneshot(multipart_upload("file", "../../precios.csv", b"a,b"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let process_id = json["process_id"].as_str().unwrap();
    assert!(dir
        .path()
        .join(format!("{process_id}_precios.csv"))
        .exists());
}

#[tokio::test]
async fn process_rejects_oversized_upload() {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(&mock_sources(), test_config(dir.path(), 64));
    let app = build_app(state, RateLimitState::per_minute(100));

    let response = app
        .oneshot(multipart_upload("file", "big.csv", &[b'x'; 4096]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn process_reports_internal_error_when_summary_fails() {
    let dir = tempfile::tempdir().unwrap();
    let sources = Sources {
        catalog: Arc::new(MockCatalog::seeded(1).with_latency(MockLatency::none())),
        comparisons: Arc::new(FailingComparisons),
    };
    let response = app_with(&sources, dir.path())
        .oneshot(multipart_upload("file", "list.csv", b"a,b"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Error interno del servidor");
}

// -------------------------------------------------------------------------
// /api/download/{id}
// -------------------------------------------------------------------------

#[tokio::test]
async fn download_returns_comparison_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let response = mock_app(dir.path())
        .oneshot(get("/api/download/abc-123"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, header::CONTENT_TYPE),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(
        header_str(&response, header::CONTENT_DISPOSITION),
        "attachment; filename=\"comparacion_precios_abc-123.xlsx\""
    );

    let bytes = body_bytes(response).await;
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
    let range = workbook
        .worksheet_range(comparador_export::COMPARISON_SHEET)
        .unwrap();
    assert!((11..=16).contains(&range.height()));
    assert_eq!(range.get_value((0, 0)).unwrap().to_string(), "Producto");
}

#[tokio::test]
async fn download_rejects_invalid_id() {
    let dir = tempfile::tempdir().unwrap();
    let response = mock_app(dir.path())
        .oneshot(get("/api/download/bad.id"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn download_reports_generation_failure() {
    let dir = tempfile::tempdir().unwrap();
    let sources = Sources {
        catalog: Arc::new(FailingCatalog),
        comparisons: Arc::new(FailingComparisons),
    };
    let response = app_with(&sources, dir.path())
        .oneshot(get("/api/download/abc-123"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await["error"],
        "Error generating download file"
    );
}

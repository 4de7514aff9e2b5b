use std::sync::Arc;

use comparador_core::{FailureKind, ProductRecord, Store, StoreFailure};
use comparador_search::{MockCatalog, MockComparisons, MockLatency, StoreResults};

use super::*;

fn mock_sources() -> Sources {
    Sources {
        catalog: Arc::new(MockCatalog::seeded(11).with_latency(MockLatency::none())),
        comparisons: Arc::new(MockComparisons::seeded(12)),
    }
}

fn record(name: &str) -> ProductRecord {
    ProductRecord {
        name: name.to_owned(),
        regular_price: "₡250.000".to_owned(),
        promo_price: "₡212.500".to_owned(),
        url: "https://www.gollo.com/productos/tv-1".to_owned(),
        image_url: String::new(),
        store: "Gollo".to_owned(),
        error: None,
    }
}

#[test]
fn parses_search_with_defaults() {
    let cli = Cli::try_parse_from(["comparador-cli", "search", "iphone"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Search {
            ref term,
            store: StoreSelection::All,
            mode: SearchMode::Concurrent,
            export: None,
        }) if term == "iphone"
    ));
}

#[test]
fn parses_search_with_store_mode_and_export() {
    let cli = Cli::try_parse_from([
        "comparador-cli",
        "search",
        "lavadora",
        "--store",
        "MONGE",
        "--mode",
        "sequential",
        "--export",
        "out.xlsx",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Some(Commands::Search {
            store,
            mode,
            export,
            ..
        }) => {
            assert_eq!(store, StoreSelection::One(Store::Monge));
            assert_eq!(mode, SearchMode::Sequential);
            assert_eq!(export, Some(PathBuf::from("out.xlsx")));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn rejects_unknown_store() {
    let result = Cli::try_parse_from(["comparador-cli", "search", "tv", "--store", "amazon"]);
    assert!(result.is_err());
}

#[test]
fn rejects_unknown_mode() {
    let result = Cli::try_parse_from(["comparador-cli", "search", "tv", "--mode", "parallel"]);
    assert!(result.is_err());
}

#[test]
fn search_requires_term() {
    assert!(Cli::try_parse_from(["comparador-cli", "search"]).is_err());
}

#[test]
fn parses_compare_default_output() {
    let cli = Cli::try_parse_from(["comparador-cli", "compare"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Compare { ref output, list: None })
            if output == &PathBuf::from("comparacion_precios.xlsx")
    ));
}

#[test]
fn parses_compare_with_list() {
    let cli = Cli::try_parse_from([
        "comparador-cli",
        "compare",
        "--output",
        "/tmp/c.xlsx",
        "--list",
        "lista.csv",
    ])
    .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Compare { list: Some(ref list), .. }) if list == "lista.csv"
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["comparador-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn render_results_shows_products_and_error_badges() {
    let mut results = StoreResults::new();
    results.insert(Store::Gollo, vec![record("Smart TV 55")]);
    results.insert(
        Store::Monge,
        vec![ProductRecord::failed(StoreFailure::new(
            Store::Monge,
            FailureKind::Unavailable,
        ))],
    );

    let text = search::render_results(&results);
    assert!(text.starts_with("Gollo (1)\n"));
    assert!(text.contains("Smart TV 55"));
    assert!(text.contains("₡212.500"));
    assert!(text.contains("Monge (0)\n  [101] Error al acceder al sitio de Monge\n"));
    assert_eq!(text.matches("PRODUCT").count(), 1);
}

#[test]
fn render_results_truncates_long_names() {
    let mut results = StoreResults::new();
    results.insert(Store::Gollo, vec![record(&"x".repeat(80))]);

    let text = search::render_results(&results);
    assert!(text.contains('…'));
    assert!(!text.contains(&"x".repeat(80)));
}

#[test]
fn render_summary_lists_counts() {
    let summary = comparador_core::BatchSummary {
        products_processed: 29,
        processing_time: "1.4 minutes".to_owned(),
        errors: 2,
        summary: "ok".to_owned(),
    };
    assert_eq!(
        compare::render_summary("lista.xlsx", &summary),
        "lista.xlsx: 29 products, 2 errors, 1.4 minutes\nok\n"
    );
}

#[tokio::test]
async fn search_exports_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resultados.xlsx");

    search::run_search(
        &mock_sources(),
        "refrigeradora",
        StoreSelection::All,
        SearchMode::Sequential,
        Some(path.as_path()),
    )
    .await
    .unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[tokio::test]
async fn search_rejects_blank_term() {
    let result = search::run_search(
        &mock_sources(),
        "   ",
        StoreSelection::All,
        SearchMode::Concurrent,
        None,
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn compare_writes_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("comparacion.xlsx");

    compare::run_compare(&mock_sources(), &path, Some("lista.csv"))
        .await
        .unwrap();

    assert!(std::fs::read(&path).unwrap().starts_with(b"PK"));
}

#[tokio::test]
async fn compare_fails_for_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("comparacion.xlsx");

    let result = compare::run_compare(&mock_sources(), &path, None).await;
    assert!(result.is_err());
}

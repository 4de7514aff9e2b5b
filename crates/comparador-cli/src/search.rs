//! `search` command: query the stores and print one table per store.

use std::path::Path;

use comparador_core::{ProductRecord, SearchMode, StoreSelection};
use comparador_export::{rows_from_results, save_to_path, write_search_results};
use comparador_search::{Sources, StoreResults};

const NAME_WIDTH: usize = 44;
const PRICE_WIDTH: usize = 14;

/// Run a search and print the per-store results.
///
/// When `export` is set, the non-error records are also written to a
/// workbook at that path.
///
/// # Errors
///
/// Returns an error if the term is blank, if there is nothing to export, or
/// if the workbook cannot be written.
pub(crate) async fn run_search(
    sources: &Sources,
    term: &str,
    selection: StoreSelection,
    mode: SearchMode,
    export: Option<&Path>,
) -> anyhow::Result<()> {
    let term = term.trim();
    anyhow::ensure!(!term.is_empty(), "search term must not be empty");

    let results = sources.aggregator().search(term, selection, mode).await;
    print!("{}", render_results(&results));

    if let Some(path) = export {
        let rows = rows_from_results(&results);
        if rows.is_empty() {
            anyhow::bail!("no results to export for '{term}'");
        }
        let bytes = write_search_results(&rows)?;
        save_to_path(path, &bytes)?;
        println!("exported {} rows to {}", rows.len(), path.display());
    }

    Ok(())
}

/// Cuts `text` to at most `width` characters, marking the cut with `…`.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_owned();
    }
    let kept: String = text.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}

fn render_record(record: &ProductRecord) -> String {
    match &record.error {
        Some(error) => format!("  [{}] {}\n", error.code, error.message),
        None => format!(
            "  {:<name$}{:<price$}{}\n",
            truncate(&record.name, NAME_WIDTH - 2),
            record.regular_price,
            record.promo_price,
            name = NAME_WIDTH,
            price = PRICE_WIDTH,
        ),
    }
}

/// One section per store, in result order: a header with the record count,
/// then the product rows or the store's error badge.
pub(crate) fn render_results(results: &StoreResults) -> String {
    let mut out = String::new();
    for (store, records) in results.iter() {
        let found = records.iter().filter(|r| !r.is_error()).count();
        out.push_str(&format!("{} ({found})\n", store.display_name()));
        if found > 0 {
            out.push_str(&format!(
                "  {:<name$}{:<price$}PROMO\n",
                "PRODUCT",
                "REGULAR",
                name = NAME_WIDTH,
                price = PRICE_WIDTH,
            ));
        }
        for record in records {
            out.push_str(&render_record(record));
        }
        out.push('\n');
    }
    out
}

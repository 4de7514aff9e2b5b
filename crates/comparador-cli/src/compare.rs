//! `compare` command: write a batch comparison workbook.

use std::path::Path;

use comparador_core::BatchSummary;
use comparador_export::{save_to_path, write_comparison};
use comparador_search::Sources;

pub(crate) fn render_summary(list: &str, summary: &BatchSummary) -> String {
    format!(
        "{list}: {} products, {} errors, {}\n{}\n",
        summary.products_processed, summary.errors, summary.processing_time, summary.summary
    )
}

/// Generate comparison rows and save them as a workbook at `output`.
///
/// # Errors
///
/// Returns an error if the comparison source fails or the workbook cannot be
/// written.
pub(crate) async fn run_compare(
    sources: &Sources,
    output: &Path,
    list: Option<&str>,
) -> anyhow::Result<()> {
    if let Some(list) = list {
        let summary = sources.comparisons.summarize_upload(list).await?;
        print!("{}", render_summary(list, &summary));
    }

    let rows = sources.comparisons.comparison_rows().await?;
    tracing::info!(rows = rows.len(), "comparison rows generated");
    let bytes = write_comparison(&rows)?;
    save_to_path(output, &bytes)?;
    println!("wrote {} comparison rows to {}", rows.len(), output.display());
    Ok(())
}

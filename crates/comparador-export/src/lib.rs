//! Spreadsheet export of search results and batch comparisons.
//!
//! Workbooks are built in memory and returned as `.xlsx` bytes; the HTTP
//! layer streams them as attachments and the CLI writes them with
//! [`save_to_path`].

pub mod rows;
pub mod workbook;

use std::path::Path;

use thiserror::Error;

pub use rows::{rows_from_results, ExportRow};
pub use workbook::{
    write_comparison, write_search_results, COMPARISON_SHEET, SEARCH_HEADERS, SEARCH_SHEET,
};

/// MIME type of an `.xlsx` workbook.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("spreadsheet writer error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Writes workbook bytes to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`ExportError::Io`] if the file cannot be written.
pub fn save_to_path(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    std::fs::write(path, bytes).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "workbook saved");
    Ok(())
}

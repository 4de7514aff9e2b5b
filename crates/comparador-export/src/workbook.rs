use comparador_core::{ComparisonRow, COMPARISON_HEADERS};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::rows::ExportRow;
use crate::ExportError;

pub const SEARCH_SHEET: &str = "Resultados de Búsqueda";
pub const COMPARISON_SHEET: &str = "Comparación de Precios";

pub const SEARCH_HEADERS: [&str; 5] = [
    "Tienda",
    "Nombre del Producto",
    "Precio Regular",
    "Precio Promoción",
    "Enlace",
];

const SEARCH_WIDTHS: [f64; 5] = [12.0, 45.0, 16.0, 22.0, 60.0];
const COMPARISON_WIDTHS: [f64; 10] = [40.0, 16.0, 16.0, 16.0, 16.0, 18.0, 18.0, 16.0, 20.0, 60.0];

/// Builds the search-results workbook: one header row, one row per product.
///
/// # Errors
///
/// Returns [`ExportError::Xlsx`] if the workbook cannot be assembled.
pub fn write_search_results(rows: &[ExportRow]) -> Result<Vec<u8>, ExportError> {
    write_sheet(
        SEARCH_SHEET,
        &SEARCH_HEADERS,
        &SEARCH_WIDTHS,
        rows.iter().map(ExportRow::cells),
    )
}

/// Builds the batch comparison workbook.
///
/// # Errors
///
/// Returns [`ExportError::Xlsx`] if the workbook cannot be assembled.
pub fn write_comparison(rows: &[ComparisonRow]) -> Result<Vec<u8>, ExportError> {
    write_sheet(
        COMPARISON_SHEET,
        &COMPARISON_HEADERS,
        &COMPARISON_WIDTHS,
        rows.iter().map(ComparisonRow::cells),
    )
}

fn write_sheet<'a, const N: usize>(
    sheet_name: &str,
    headers: &[&str; N],
    widths: &[f64; N],
    rows: impl Iterator<Item = [&'a str; N]>,
) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;
    write_header(sheet, headers, widths)?;

    let mut written = 0u32;
    for (row_idx, cells) in (1u32..).zip(rows) {
        for (col, value) in (0u16..).zip(cells) {
            if !value.is_empty() {
                sheet.write_string(row_idx, col, value)?;
            }
        }
        written = row_idx;
    }

    let bytes = workbook.save_to_buffer()?;
    tracing::debug!(sheet = sheet_name, rows = written, bytes = bytes.len(), "workbook built");
    Ok(bytes)
}

fn write_header<const N: usize>(
    sheet: &mut Worksheet,
    headers: &[&str; N],
    widths: &[f64; N],
) -> Result<(), ExportError> {
    let bold = Format::new().set_bold();
    for ((col, header), width) in (0u16..).zip(headers).zip(widths) {
        sheet.write_string_with_format(0, col, *header, &bold)?;
        sheet.set_column_width(col, *width)?;
    }
    Ok(())
}

// Excel/ODS import into the engine's typed table

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use gainbook_recon::{Cell, ReconError, Table, TableReader};

/// Maximum number of cells to import (prevents DoS from huge files)
const MAX_CELLS: usize = 5_000_000;

/// Reads one named worksheet of an xlsx/xls/xlsb/ods workbook.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxTableReader;

impl TableReader for XlsxTableReader {
    fn read_table(&self, path: &Path, sheet: &str) -> Result<Table, ReconError> {
        read_sheet(path, sheet)
    }
}

/// Import `sheet` as a table whose first non-empty row supplies column names.
///
/// Leading empty columns are kept (as `Unnamed: <n>`), so column order matches
/// the sheet. Leading empty rows are not part of the used range and are
/// dropped by calamine.
pub fn read_sheet(path: &Path, sheet: &str) -> Result<Table, ReconError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| ReconError::DocumentRead {
        path: path.display().to_string(),
        reason: format!("failed to open spreadsheet: {e}"),
    })?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if !sheet_names.iter().any(|n| n == sheet) {
        return Err(ReconError::SheetNotFound { sheet: sheet.to_string(), available: sheet_names });
    }

    let range = workbook.worksheet_range(sheet).map_err(|e| ReconError::DocumentRead {
        path: path.display().to_string(),
        reason: format!("failed to read sheet '{sheet}': {e}"),
    })?;

    // Range start offset (data may not begin at A1)
    let (_, data_start_col) = range.start().unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(range.height());
    let mut total_cells = 0usize;
    for row in range.rows() {
        if total_cells >= MAX_CELLS {
            log::warn!("sheet '{sheet}': import stopped at {MAX_CELLS} cells (limit reached)");
            break;
        }
        let mut cells = vec![Cell::Empty; data_start_col as usize];
        cells.extend(row.iter().map(to_cell));
        total_cells += row.len();
        rows.push(cells);
    }

    Ok(Table::from_rows(rows))
}

/// Keep the source typing: numbers stay numbers, text stays text.
fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Float(*n),
        Data::Int(n) => Cell::Int(*n),
        Data::Bool(b) => Cell::Bool(*b),
        Data::Error(e) => Cell::Error(format!("#{:?}", e)),
        // Date serials are not amounts, even though they are stored as numbers
        Data::DateTime(dt) => Cell::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

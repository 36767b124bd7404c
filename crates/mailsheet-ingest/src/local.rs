//! Local spreadsheet files: calamine workbooks and CSV.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use tracing::{debug, info};

use mailsheet_model::SheetData;

use crate::cells::cell_to_string;
use crate::error::{IngestError, Result};
use crate::range::SheetRange;

/// Full sheet grid anchored at `A1`.
pub type CellGrid = Vec<Vec<Data>>;

/// Returns true when the path has a `.csv` extension.
pub fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Reads every cell of `sheet_name`, with row 0 and column 0 at `A1`.
///
/// CSV files have a single unnamed sheet, so `sheet_name` is ignored for them.
///
/// # Errors
///
/// Returns an error when the file is missing, unreadable or has no such sheet.
pub fn read_cells(path: &Path, sheet_name: &str) -> Result<CellGrid> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    if is_csv(path) {
        debug!(path = %path.display(), "reading CSV, sheet name ignored");
        return read_csv_cells(path);
    }

    let workbook_error = |source| IngestError::Workbook {
        path: path.to_path_buf(),
        source,
    };
    let mut workbook = open_workbook_auto(path).map_err(workbook_error)?;
    if !workbook.sheet_names().iter().any(|name| name == sheet_name) {
        return Err(IngestError::SheetNotFound {
            sheet: sheet_name.to_string(),
            path: path.to_path_buf(),
        });
    }
    let range = workbook.worksheet_range(sheet_name).map_err(workbook_error)?;
    let Some((last_row, last_column)) = range.end() else {
        return Ok(Vec::new());
    };

    let grid = (0..=last_row)
        .map(|row| {
            (0..=last_column)
                .map(|column| range.get_value((row, column)).cloned().unwrap_or_default())
                .collect()
        })
        .collect();
    Ok(grid)
}

fn read_csv_cells(path: &Path) -> Result<CellGrid> {
    let csv_error = |source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        grid.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Data::Empty
                    } else {
                        Data::String(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(grid)
}

/// Cuts `range` out of a grid as normalized text.
///
/// Cells outside the grid read as empty. Trailing rows that are entirely
/// empty are dropped, so open-ended and oversized ranges stop at the data.
pub fn slice_grid(grid: &CellGrid, range: SheetRange) -> SheetData {
    let (first_row, last_row) = match range.rows {
        Some(rows) => rows,
        None if grid.is_empty() => return SheetData::default(),
        None => (0, (grid.len() - 1) as u32),
    };

    let mut rows: Vec<Vec<String>> = (first_row..=last_row)
        .map(|row| {
            let cells = grid.get(row as usize);
            (range.first_column..=range.last_column)
                .map(|column| {
                    cells
                        .and_then(|cells| cells.get(column as usize))
                        .map(cell_to_string)
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();
    while rows
        .last()
        .is_some_and(|row| row.iter().all(String::is_empty))
    {
        rows.pop();
    }
    SheetData::new(rows)
}

/// Reads `range` of a local sheet.
///
/// # Errors
///
/// See [`read_cells`].
pub fn read_local(path: &Path, sheet_name: &str, range: SheetRange) -> Result<SheetData> {
    let grid = read_cells(path, sheet_name)?;
    let data = slice_grid(&grid, range);
    info!(
        path = %path.display(),
        sheet = sheet_name,
        range = %range,
        rows = data.len(),
        "read local sheet"
    );
    Ok(data)
}

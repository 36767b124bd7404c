//! Single-row workbook extraction.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use calamine::Data;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use tracing::debug;

use mailsheet_core::{AttachmentExtractor, BoxError, ExtractRequest};

use crate::error::{IngestError, Result};
use crate::local::{CellGrid, read_cells};

/// Number format applied to date cells.
const DATE_NUM_FORMAT: &str = "dd/mm/yyyy";

/// Sheet grid read once and reused for every row of the run.
struct CachedSheet {
    source: PathBuf,
    sheet_name: String,
    grid: Arc<CellGrid>,
}

/// Writes workbooks holding the header rows plus one data row.
///
/// Only values are copied. The output has a single sheet with the source
/// sheet's name.
pub struct XlsxRowExtractor {
    output_dir: PathBuf,
    cache: Mutex<Option<CachedSheet>>,
}

impl XlsxRowExtractor {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            cache: Mutex::new(None),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes rows `1..=header_end_row` and row
    /// `header_end_row + data_row_offset + 1` (1-based) to a new workbook.
    ///
    /// # Errors
    ///
    /// Fails when the source cannot be read, the data row is past the end of
    /// the sheet or the workbook cannot be saved.
    pub fn extract(&self, request: &ExtractRequest<'_>) -> Result<PathBuf> {
        let grid = self.grid(request.source, request.sheet_name)?;
        let data_index = request.data_row() - 1;
        if data_index >= grid.len() {
            return Err(IngestError::RowOutOfRange {
                row: request.data_row(),
                last: grid.len(),
                sheet: request.sheet_name.to_string(),
            });
        }

        let path = self.output_dir.join(request.file_name);
        let rows = grid
            .iter()
            .take(request.header_end_row)
            .chain(std::iter::once(&grid[data_index]));
        write_workbook(&path, request.sheet_name, rows)?;
        debug!(
            path = %path.display(),
            row = request.data_row(),
            "extracted row workbook"
        );
        Ok(path)
    }

    fn grid(&self, source: &Path, sheet_name: &str) -> Result<Arc<CellGrid>> {
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(cached) = cache.as_ref()
            && cached.source == source
            && cached.sheet_name == sheet_name
        {
            return Ok(Arc::clone(&cached.grid));
        }
        let grid = Arc::new(read_cells(source, sheet_name)?);
        *cache = Some(CachedSheet {
            source: source.to_path_buf(),
            sheet_name: sheet_name.to_string(),
            grid: Arc::clone(&grid),
        });
        Ok(grid)
    }
}

impl AttachmentExtractor for XlsxRowExtractor {
    fn extract_single_row(&self, request: &ExtractRequest<'_>) -> std::result::Result<PathBuf, BoxError> {
        self.extract(request).map_err(Into::into)
    }
}

fn write_workbook<'a>(
    path: &Path,
    sheet_name: &str,
    rows: impl Iterator<Item = &'a Vec<Data>>,
) -> Result<()> {
    let xlsx_error = |source| IngestError::XlsxWrite {
        path: path.to_path_buf(),
        source,
    };
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).map_err(xlsx_error)?;
    let date_format = Format::new().set_num_format(DATE_NUM_FORMAT);

    for (out_row, cells) in rows.enumerate() {
        let out_row = u32::try_from(out_row).map_err(|_| xlsx_error(XlsxError::RowColumnLimitError))?;
        for (column, cell) in cells.iter().enumerate() {
            let column =
                u16::try_from(column).map_err(|_| xlsx_error(XlsxError::RowColumnLimitError))?;
            write_cell(worksheet, out_row, column, cell, &date_format).map_err(xlsx_error)?;
        }
    }
    workbook.save(path).map_err(xlsx_error)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    column: u16,
    cell: &Data,
    date_format: &Format,
) -> std::result::Result<(), XlsxError> {
    match cell {
        Data::Empty => {}
        Data::String(value) | Data::DateTimeIso(value) | Data::DurationIso(value) => {
            worksheet.write_string(row, column, value)?;
        }
        Data::Float(value) => {
            worksheet.write_number(row, column, *value)?;
        }
        Data::Int(value) => {
            worksheet.write_number(row, column, *value as f64)?;
        }
        Data::Bool(value) => {
            worksheet.write_boolean(row, column, *value)?;
        }
        Data::DateTime(value) => {
            worksheet.write_number_with_format(row, column, value.as_f64(), date_format)?;
        }
        Data::Error(error) => {
            worksheet.write_string(row, column, error.to_string())?;
        }
    }
    Ok(())
}

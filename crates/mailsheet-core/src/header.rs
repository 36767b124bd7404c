//! Header resolution: turning a band of raw rows into column names.
//!
//! Multi-row headers fold into composite names. With a band of
//!
//! ```text
//! | Customer |       | Contact |
//! |          | Name  | Email   |
//! ```
//!
//! the mapping becomes `{0: "Customer", 1: "Name", 2: "Contact Email"}`.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use tracing::debug;

use mailsheet_model::{ColumnMapping, HeaderBand, SheetData};

use crate::error::{CoreError, Result};

/// Strategy used to derive a [`ColumnMapping`] from a header band.
pub trait HeaderStrategy {
    /// Resolves the band into a non-empty mapping.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::BandOutOfRange`] when the band does not fit in
    /// `rows`, and [`CoreError::HeaderResolution`] when no column name is found.
    fn resolve(&self, rows: &SheetData, band: HeaderBand) -> Result<ColumnMapping>;
}

/// Uses only the band rows whose width equals the widest row in the band.
///
/// Rows that are shorter are assumed to carry no header text. Within the
/// surviving rows, non-blank cells of the same column are joined with a space.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactWidth;

impl HeaderStrategy for ExactWidth {
    fn resolve(&self, rows: &SheetData, band: HeaderBand) -> Result<ColumnMapping> {
        let band_rows = rows
            .rows()
            .get(band.rows())
            .ok_or(CoreError::BandOutOfRange {
                start: band.start(),
                end: band.end(),
                rows: rows.len(),
            })?;
        let width = band_rows.iter().map(Vec::len).max().unwrap_or(0);

        let mut names: BTreeMap<usize, String> = BTreeMap::new();
        for (offset, row) in band_rows.iter().enumerate() {
            if row.len() != width {
                debug!(
                    row = band.start() + offset,
                    row_width = row.len(),
                    width,
                    "skipping ragged header row"
                );
                continue;
            }
            for (column, cell) in row.iter().enumerate() {
                if cell.trim().is_empty() {
                    continue;
                }
                match names.entry(column) {
                    Entry::Vacant(entry) => {
                        entry.insert(cell.trim().to_string());
                    }
                    Entry::Occupied(mut entry) => {
                        let joined = format!("{} {cell}", entry.get());
                        *entry.get_mut() = joined.trim().to_string();
                    }
                }
            }
        }

        let mapping: ColumnMapping = names.into_iter().collect();
        if mapping.is_empty() {
            return Err(CoreError::HeaderResolution {
                start: band.start(),
                end: band.end(),
            });
        }
        debug!(columns = mapping.len(), width, "resolved header columns");
        Ok(mapping)
    }
}

/// Resolves `band` with the default [`ExactWidth`] strategy.
///
/// The mapping iterates in ascending column order, not in the order columns
/// are first seen while walking the band rows.
///
/// # Errors
///
/// See [`HeaderStrategy::resolve`].
pub fn resolve_headers(rows: &SheetData, band: HeaderBand) -> Result<ColumnMapping> {
    ExactWidth.resolve(rows, band)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: &[&[&str]]) -> SheetData {
        SheetData::new(
            rows.iter()
                .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn single_row_header() {
        let data = sheet(&[&["Name", "Email", ""], &["Ann", "ann@x.com", "1"]]);
        let mapping = resolve_headers(&data, HeaderBand::single(0)).unwrap();
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get(0), Some("Name"));
        assert_eq!(mapping.get(1), Some("Email"));
    }

    #[test]
    fn complementary_rows_fill_columns() {
        let data = sheet(&[&["Customer", ""], &["", "Name"]]);
        let mapping = resolve_headers(&data, HeaderBand::new(0, 1).unwrap()).unwrap();
        assert_eq!(mapping.get(0), Some("Customer"));
        assert_eq!(mapping.get(1), Some("Name"));
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn stacked_rows_join_with_space() {
        let data = sheet(&[&["Customer", "Due"], &["Name", " Date "]]);
        let mapping = resolve_headers(&data, HeaderBand::new(0, 1).unwrap()).unwrap();
        assert_eq!(mapping.get(0), Some("Customer Name"));
        assert_eq!(mapping.get(1), Some("Due  Date"));
    }

    #[test]
    fn narrower_rows_are_ignored() {
        let data = sheet(&[&["Ignored", "Also ignored"], &["A", "B", "C"]]);
        let mapping = resolve_headers(&data, HeaderBand::new(0, 1).unwrap()).unwrap();
        assert_eq!(mapping.names().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    }

    #[test]
    fn columns_iterate_in_ascending_order() {
        let data = sheet(&[&["", "Contact"], &["Name", "Email"]]);
        let mapping = resolve_headers(&data, HeaderBand::new(0, 1).unwrap()).unwrap();
        assert_eq!(
            mapping.iter().collect::<Vec<_>>(),
            vec![(0, "Name"), (1, "Contact Email")]
        );
    }

    #[test]
    fn blank_band_fails() {
        let data = sheet(&[&["", " "], &["x"]]);
        let err = resolve_headers(&data, HeaderBand::single(0)).unwrap_err();
        assert!(matches!(err, CoreError::HeaderResolution { start: 0, end: 0 }));
    }

    #[test]
    fn band_past_data_fails() {
        let data = sheet(&[&["Name"]]);
        let err = resolve_headers(&data, HeaderBand::new(0, 2).unwrap()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::BandOutOfRange {
                start: 0,
                end: 2,
                rows: 1
            }
        ));
    }
}

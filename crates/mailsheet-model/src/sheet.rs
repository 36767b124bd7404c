use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Cell values read from a sheet range, one `Vec<String>` per row.
///
/// Providers normalize empty cells to `""` and dates to `DD/MM/YYYY`.
/// Rows are not padded, so widths may differ.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetData {
    rows: Vec<Vec<String>>,
}

impl SheetData {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows from `start` to the end; empty when `start` is past the last row.
    pub fn rows_from(&self, start: usize) -> &[Vec<String>] {
        self.rows.get(start..).unwrap_or(&[])
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}

impl From<Vec<Vec<String>>> for SheetData {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self::new(rows)
    }
}

/// Closed, 0-based interval of rows holding header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderBand {
    start: usize,
    end: usize,
}

impl HeaderBand {
    /// Returns `None` when `start > end`.
    pub fn new(start: usize, end: usize) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// A band made of a single row.
    pub fn single(row: usize) -> Self {
        Self {
            start: row,
            end: row,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn rows(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    /// Index of the first row after the band.
    pub fn next_row(&self) -> usize {
        self.end + 1
    }
}

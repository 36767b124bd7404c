//! A1-style sheet range parsing.

use std::fmt;
use std::str::FromStr;

use crate::error::{IngestError, Result};

/// Rectangular sheet range with 0-based, inclusive bounds.
///
/// `rows` is `None` for column-only ranges such as `A:C`, which cover every
/// row of the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetRange {
    pub first_column: u32,
    pub last_column: u32,
    pub rows: Option<(u32, u32)>,
}

impl SheetRange {
    /// Parses `A1:B2` or `A:B`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::InvalidRange`] for anything else, including
    /// ranges whose start is after their end.
    pub fn parse(expression: &str) -> Result<Self> {
        let (start, end) = expression
            .trim()
            .split_once(':')
            .ok_or_else(|| IngestError::range(expression, "expected START:END"))?;
        let (first_column, first_row) = parse_cell(expression, start)?;
        let (last_column, last_row) = parse_cell(expression, end)?;
        let rows = match (first_row, last_row) {
            (Some(first), Some(last)) => Some((first, last)),
            (None, None) => None,
            _ => {
                return Err(IngestError::range(
                    expression,
                    "both ends need a row number, or neither",
                ));
            }
        };
        if first_column > last_column || rows.is_some_and(|(first, last)| first > last) {
            return Err(IngestError::range(expression, "start is after end"));
        }
        Ok(Self {
            first_column,
            last_column,
            rows,
        })
    }

    /// First 0-based sheet row covered by the range.
    pub fn first_row(&self) -> u32 {
        self.rows.map_or(0, |(first, _)| first)
    }
}

impl FromStr for SheetRange {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for SheetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rows {
            Some((first, last)) => write!(
                f,
                "{}{}:{}{}",
                column_letters(self.first_column),
                first + 1,
                column_letters(self.last_column),
                last + 1
            ),
            None => write!(
                f,
                "{}:{}",
                column_letters(self.first_column),
                column_letters(self.last_column)
            ),
        }
    }
}

/// Splits `AB12` into a 0-based column and optional 0-based row.
fn parse_cell(expression: &str, cell: &str) -> Result<(u32, Option<u32>)> {
    let cell = cell.trim();
    let split = cell
        .find(|ch: char| !ch.is_ascii_alphabetic())
        .unwrap_or(cell.len());
    let (letters, digits) = cell.split_at(split);
    let column = column_index(letters)
        .ok_or_else(|| IngestError::range(expression, format!("bad column in '{cell}'")))?;
    if digits.is_empty() {
        return Ok((column, None));
    }
    let row: u32 = digits
        .parse()
        .map_err(|_| IngestError::range(expression, format!("bad row in '{cell}'")))?;
    let row = row
        .checked_sub(1)
        .ok_or_else(|| IngestError::range(expression, "row numbers start at 1"))?;
    Ok((column, Some(row)))
}

/// `A` → 0, `Z` → 25, `AA` → 26.
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    let mut index: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        index = index * 26 + (ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    Some(index - 1)
}

/// Inverse of [`column_index`].
pub fn column_letters(index: u32) -> String {
    let mut letters = Vec::new();
    let mut remaining = index + 1;
    while remaining > 0 {
        let rem = (remaining - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        remaining = (remaining - 1) / 26;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cell_range() {
        let range = SheetRange::parse("B2:D10").unwrap();
        assert_eq!(range.first_column, 1);
        assert_eq!(range.last_column, 3);
        assert_eq!(range.rows, Some((1, 9)));
        assert_eq!(range.first_row(), 1);
        assert_eq!(range.to_string(), "B2:D10");
    }

    #[test]
    fn parses_column_range() {
        let range: SheetRange = "a:ab".parse().unwrap();
        assert_eq!(range.first_column, 0);
        assert_eq!(range.last_column, 27);
        assert_eq!(range.rows, None);
        assert_eq!(range.first_row(), 0);
        assert_eq!(range.to_string(), "A:AB");
    }

    #[test]
    fn rejects_invalid_ranges() {
        for expression in ["", "A1", "A1:B", "1:2", "B1:A1", "A5:B2", "A0:B2", "A1:B2x", "A-1:B2"] {
            assert!(
                matches!(
                    SheetRange::parse(expression),
                    Err(IngestError::InvalidRange { .. })
                ),
                "{expression}"
            );
        }
    }

    #[test]
    fn column_letters_round_trip() {
        for (index, letters) in [(0, "A"), (25, "Z"), (26, "AA"), (701, "ZZ"), (702, "AAA")] {
            assert_eq!(column_letters(index), letters);
            assert_eq!(column_index(letters), Some(index));
        }
    }
}

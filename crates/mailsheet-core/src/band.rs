//! Parsing of header band expressions.

use mailsheet_model::HeaderBand;

use crate::error::{CoreError, Result};

/// Parses a 1-based header line expression into a 0-based [`HeaderBand`].
///
/// Accepts a single line (`"2"`) or an inclusive interval (`"1-3"`).
pub fn parse_header_band(expression: &str) -> Result<HeaderBand> {
    let trimmed = expression.trim();
    let (first, last) = match trimmed.split_once('-') {
        Some((first, last)) => (first, last),
        None => (trimmed, trimmed),
    };
    let start = parse_line(expression, first)?;
    let end = parse_line(expression, last)?;
    HeaderBand::new(start, end)
        .ok_or_else(|| CoreError::range(expression, "first line is after last line"))
}

fn parse_line(expression: &str, raw: &str) -> Result<usize> {
    let line: usize = raw
        .trim()
        .parse()
        .map_err(|_| CoreError::range(expression, format!("'{}' is not a line number", raw.trim())))?;
    line.checked_sub(1)
        .ok_or_else(|| CoreError::range(expression, "line numbers start at 1"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_line() {
        let band = parse_header_band("1").unwrap();
        assert_eq!((band.start(), band.end()), (0, 0));
    }

    #[test]
    fn parses_interval_with_spaces() {
        let band = parse_header_band(" 2 - 4 ").unwrap();
        assert_eq!((band.start(), band.end()), (1, 3));
    }

    #[test]
    fn rejects_bad_expressions() {
        for expression in ["", "0", "3-1", "a-2", "1-", "1-2-3"] {
            let err = parse_header_band(expression).unwrap_err();
            assert!(
                matches!(err, CoreError::RangeResolution { .. }),
                "{expression}: {err}"
            );
        }
    }
}

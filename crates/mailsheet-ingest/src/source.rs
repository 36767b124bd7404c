//! Sheet source dispatch between local files and shared spreadsheets.

use std::fmt;
use std::path::{Path, PathBuf};

use mailsheet_model::SheetData;

use crate::error::Result;
use crate::local::read_local;
use crate::range::SheetRange;
use crate::remote::GoogleSheet;

/// Identifiers containing this marker are read remotely.
pub const REMOTE_MARKER: &str = "google.com";

/// Where the rows of a run come from.
#[derive(Debug)]
pub enum SheetSource {
    /// A workbook or CSV file on disk.
    Local(PathBuf),
    /// A spreadsheet shared by URL.
    Remote(GoogleSheet),
}

impl SheetSource {
    /// Picks the source kind from the identifier.
    ///
    /// # Errors
    ///
    /// Remote identifiers fail without an access token or a spreadsheet id.
    pub fn from_identifier(identifier: &str, access_token: Option<&str>) -> Result<Self> {
        if identifier.contains(REMOTE_MARKER) {
            GoogleSheet::from_url(identifier, access_token).map(Self::Remote)
        } else {
            Ok(Self::Local(PathBuf::from(identifier)))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Reads `range` of `sheet_name` as normalized text.
    pub fn read(&self, sheet_name: &str, range: SheetRange) -> Result<SheetData> {
        match self {
            Self::Local(path) => read_local(path, sheet_name, range),
            Self::Remote(sheet) => sheet.read_values(sheet_name, range),
        }
    }

    /// Returns a local workbook path that row extraction can open.
    ///
    /// Remote spreadsheets are downloaded into `work_dir` first.
    pub fn local_workbook(&self, work_dir: &Path) -> Result<PathBuf> {
        match self {
            Self::Local(path) => Ok(path.clone()),
            Self::Remote(sheet) => {
                let path = work_dir.join(format!("{}.xlsx", sheet.spreadsheet_id()));
                sheet.download_xlsx(&path)?;
                Ok(path)
            }
        }
    }
}

impl fmt::Display for SheetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(sheet) => f.write_str(sheet.url()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_on_identifier() {
        let local = SheetSource::from_identifier("data/roster.xlsx", None).unwrap();
        assert!(!local.is_remote());
        assert_eq!(local.to_string(), "data/roster.xlsx");

        let remote = SheetSource::from_identifier(
            "https://docs.google.com/spreadsheets/d/abc/edit",
            Some("token"),
        )
        .unwrap();
        assert!(remote.is_remote());
    }

    #[test]
    fn local_workbook_is_the_file_itself() {
        let source = SheetSource::from_identifier("roster.xlsx", None).unwrap();
        assert_eq!(
            source.local_workbook(Path::new("/tmp")).unwrap(),
            PathBuf::from("roster.xlsx")
        );
    }
}

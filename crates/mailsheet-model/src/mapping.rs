use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Column index to header name, iterated in ascending column order.
///
/// Entries with blank names are dropped on construction, so every name held
/// here is non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    columns: BTreeMap<usize, String>,
}

impl ColumnMapping {
    pub fn get(&self, column: usize) -> Option<&str> {
        self.columns.get(&column).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.columns
            .iter()
            .map(|(column, name)| (*column, name.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.values().map(String::as_str)
    }

    /// First column whose header equals `name` exactly.
    pub fn column_of(&self, name: &str) -> Option<usize> {
        self.iter()
            .find_map(|(column, header)| (header == name).then_some(column))
    }
}

impl FromIterator<(usize, String)> for ColumnMapping {
    fn from_iter<I: IntoIterator<Item = (usize, String)>>(iter: I) -> Self {
        let columns = iter
            .into_iter()
            .filter(|(_, name)| !name.trim().is_empty())
            .collect();
        Self { columns }
    }
}

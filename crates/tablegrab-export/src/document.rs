//! CSV document ready to be saved

use serde::Serialize;
use tablegrab_provider::{Row, Table};

use crate::csv;
use crate::filename::sanitize;

pub const CSV_MIME_TYPE: &str = "text/csv; charset=utf-8";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvDocument {
    /// Sanitized base name plus `.csv`
    pub file_name: String,
    pub contents: String,
}

impl CsvDocument {
    pub fn from_rows(base_name: &str, rows: &[Row]) -> Self {
        Self {
            file_name: format!("{}.csv", sanitize(base_name)),
            contents: csv::encode(rows),
        }
    }

    /// Document for one table of the page's table list.
    ///
    /// Untitled tables are named `table_N` (1-based).
    pub fn for_table(table: &Table, index: usize) -> Self {
        let base_name = match table.title.as_deref() {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => format!("table_{}", index + 1),
        };
        Self::from_rows(&base_name, &table.data)
    }

    /// Document for rows accumulated over several pages of one table.
    pub fn paginated(title: &str, rows: &[Row]) -> Self {
        Self::from_rows(&format!("{}_paginated", title), rows)
    }

    pub fn mime_type(&self) -> &'static str {
        CSV_MIME_TYPE
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

//! Table data structure

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

/// A single cell as the content script reports it. Usually a string.
pub type Cell = Value;

pub type Row = Vec<Cell>;

/// A table detected on a page.
///
/// Tables have no stable identity; they are addressed by their position in
/// the page's table list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Caption or nearby heading, if the page has one
    #[serde(default)]
    pub title: Option<String>,
    pub rows: usize,
    pub cols: usize,
    #[serde(default)]
    pub data: Vec<Row>,
}

impl Table {
    pub fn new(title: Option<String>, data: Vec<Row>) -> Self {
        let cols = data.first().map(Vec::len).unwrap_or(0);
        Self {
            title,
            rows: data.len(),
            cols,
            data,
        }
    }

    /// Name shown in the table list: the page title, or `Table N` (1-based).
    pub fn display_title(&self, index: usize) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => format!("Table {}", index + 1),
        }
    }

    pub fn summary(&self) -> String {
        format!("{} rows × {} columns", self.rows, self.cols)
    }

    /// Every row has exactly `cols` cells and `rows` matches the data.
    pub fn is_rectangular(&self) -> bool {
        self.data.len() == self.rows && self.data.iter().all(|row| row.len() == self.cols)
    }
}

/// Text of a cell as it appears in an exported document.
///
/// Missing values export as empty text; strings as-is; other scalars in
/// their JSON form.
pub fn cell_text(cell: &Cell) -> Cow<'_, str> {
    match cell {
        Value::Null => Cow::Borrowed(""),
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Bool(b) => Cow::Owned(b.to_string()),
        Value::Number(n) => Cow::Owned(n.to_string()),
        other => Cow::Owned(other.to_string()),
    }
}

//! Pagination session data structure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tablegrab_provider::{Row, TabId};

use crate::merge::{merge, MergeResult};

/// Rows of one table accumulated across pages, owned by one browser tab.
///
/// Persisted as JSON in camelCase so records written by the extension
/// itself load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationSession {
    pub tab_id: TabId,
    /// Position of the captured table in the page's table list
    pub table_index: usize,
    pub title: String,
    #[serde(default)]
    pub data: Vec<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl PaginationSession {
    pub fn new(tab_id: TabId, table_index: usize, title: Option<&str>) -> Self {
        let title = match title.map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => format!("Table {}", table_index + 1),
        };
        let now = Utc::now();

        Self {
            tab_id,
            table_index,
            title,
            data: Vec::new(),
            started_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Session with `page` merged into its rows. `self` is left untouched
    /// so a failed save can simply drop the result.
    pub fn with_page(&self, page: &[Row]) -> (Self, MergeResult) {
        let result = merge(&self.data, page);

        let mut next = self.clone();
        next.data = result.merged.clone();
        next.updated_at = Some(Utc::now());

        (next, result)
    }

    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    pub fn header(&self) -> Option<&Row> {
        self.data.first()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

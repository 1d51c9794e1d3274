//! Messages exchanged with the content script.
//!
//! ```text
//! {"action":"getTables"}                        -> {"tables":[Table…]}
//! {"action":"getTableByIndex","tableIndex":n}   -> {"table":Table} | {}
//! ```

use serde::{Deserialize, Serialize};

use crate::table::Table;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum TableRequest {
    GetTables,
    #[serde(rename_all = "camelCase")]
    GetTableByIndex { table_index: usize },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TablesResponse {
    /// Absent when the page has nothing table-like
    #[serde(default)]
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,
}

//! Table provider contract

use async_trait::async_trait;

use crate::table::Table;
use crate::{Result, TabId};

/// Source of page tables for a browser tab.
///
/// Each call is one request/response round trip with no timeout of its own;
/// an unreachable tab must surface as an error rather than a hang.
#[async_trait]
pub trait TableProvider: Send + Sync {
    /// All tables on the page currently shown in `tab_id`.
    async fn get_tables(&self, tab_id: TabId) -> Result<Vec<Table>>;

    /// Table at `index` in the page's table list, `None` if there is none.
    async fn get_table(&self, tab_id: TabId, index: usize) -> Result<Option<Table>>;
}

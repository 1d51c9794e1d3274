//! Page snapshot channel
//!
//! Stands in for the content script: a JSON file shaped like a `getTables`
//! reply (`{"tables":[...]}`) answers both table requests. The file is read
//! on every message, so rewriting it between commands is how a page
//! "navigates".

use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;

use tablegrab_core::{MessageChannel, ProviderError, TabId, TableRequest, TablesResponse};

pub struct PageSnapshotChannel {
    path: Option<PathBuf>,
}

impl PageSnapshotChannel {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    async fn read_snapshot(&self) -> Result<Option<TablesResponse>, ProviderError> {
        let Some(path) = &self.path else {
            return Ok(None);
        };

        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No page snapshot");
                return Ok(None);
            }
            Err(e) => {
                return Err(ProviderError::Channel(format!("{}: {}", path.display(), e)));
            }
        };

        let snapshot = serde_json::from_str(&text)
            .map_err(|e| ProviderError::Channel(format!("{}: {}", path.display(), e)))?;
        Ok(Some(snapshot))
    }
}

#[async_trait]
impl MessageChannel for PageSnapshotChannel {
    async fn send(
        &self,
        tab_id: TabId,
        message: Value,
    ) -> Result<Option<Value>, ProviderError> {
        let request: TableRequest = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(tab_id = %tab_id, error = %e, "Ignoring unknown message");
                return Ok(None);
            }
        };

        let Some(snapshot) = self.read_snapshot().await? else {
            return Ok(None);
        };

        let reply = match request {
            TableRequest::GetTables => serde_json::to_value(&snapshot)?,
            TableRequest::GetTableByIndex { table_index } => match snapshot.tables.get(table_index) {
                Some(table) => json!({ "table": table }),
                None => json!({}),
            },
        };

        Ok(Some(reply))
    }
}

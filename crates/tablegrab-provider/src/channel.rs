//! Raw tab messaging and the provider built on it.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ProviderError;
use crate::protocol::{TableRequest, TableResponse, TablesResponse};
use crate::provider::TableProvider;
use crate::table::Table;
use crate::{Result, TabId};

/// One-shot JSON messaging to the content script of a tab.
///
/// `Ok(None)` means the message was delivered but nobody answered, which is
/// what a tab without a content script looks like.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    async fn send(&self, tab_id: TabId, message: Value) -> Result<Option<Value>>;
}

/// [`TableProvider`] speaking the `getTables` / `getTableByIndex` protocol
/// over a [`MessageChannel`].
pub struct MessagingProvider<C> {
    channel: C,
}

impl<C: MessageChannel> MessagingProvider<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    async fn request<T: DeserializeOwned>(&self, tab_id: TabId, request: TableRequest) -> Result<T> {
        let message = serde_json::to_value(&request)?;
        tracing::debug!(tab_id = %tab_id, message = %message, "Sending table request");

        let response = self
            .channel
            .send(tab_id, message)
            .await?
            .ok_or(ProviderError::NoResponse(tab_id))?;

        serde_json::from_value(response).map_err(|e| ProviderError::InvalidResponse {
            tab_id,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl<C: MessageChannel> TableProvider for MessagingProvider<C> {
    async fn get_tables(&self, tab_id: TabId) -> Result<Vec<Table>> {
        let response: TablesResponse = self.request(tab_id, TableRequest::GetTables).await?;

        tracing::debug!(tab_id = %tab_id, count = response.tables.len(), "Received tables");
        Ok(response.tables)
    }

    async fn get_table(&self, tab_id: TabId, index: usize) -> Result<Option<Table>> {
        let response: TableResponse = self
            .request(tab_id, TableRequest::GetTableByIndex { table_index: index })
            .await?;

        match response.table {
            Some(table) if !table.is_rectangular() => Err(ProviderError::InvalidResponse {
                tab_id,
                message: format!("table {} is not rectangular", index),
            }),
            other => Ok(other),
        }
    }
}

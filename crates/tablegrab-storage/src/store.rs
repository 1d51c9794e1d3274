//! Async key-value contract
//!
//! The extension storage area offers whole-value get/set/remove only, so
//! this trait exposes nothing finer. Callers that update part of a stored
//! value must read, modify and write it back themselves.

use async_trait::async_trait;
use serde_json::Value;

use crate::database::Database;
use crate::Result;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, or `None` if the key was never set.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the value stored under `key`.
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Remove `key`. Returns whether anything was removed.
    async fn remove(&self, key: &str) -> Result<bool>;
}

/// Durable store on top of [`Database`].
///
/// SQLite calls are blocking, so each one runs on tokio's blocking pool.
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let db = self.db.clone();
        let key = key.to_string();
        let raw = tokio::task::spawn_blocking(move || db.get_value(&key)).await??;

        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let text = serde_json::to_string(&value)?;
        let bytes = text.len();
        let db = self.db.clone();
        let owned_key = key.to_string();
        tokio::task::spawn_blocking(move || db.set_value(&owned_key, &text)).await??;

        tracing::debug!(key = %key, bytes, "Stored value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let db = self.db.clone();
        let key = key.to_string();
        let removed = tokio::task::spawn_blocking(move || db.remove_value(&key)).await??;
        Ok(removed)
    }
}

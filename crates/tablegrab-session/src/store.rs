//! Session Store
//!
//! All sessions live in one record, a map from tab id (decimal string) to
//! session, under [`SESSIONS_KEY`]. The key-value store only offers whole
//! values, so `save` and `delete` read the map, change one entry and write
//! the map back.
//!
//! Writers going through the same `SessionStore` (or its clones) are
//! serialized. Separate processes sharing the backing store are not: the
//! last one to write the map wins.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use tablegrab_provider::TabId;
use tablegrab_storage::{KeyValueStore, StorageError};

use crate::session::PaginationSession;
use crate::Result;

pub const SESSIONS_KEY: &str = "paginationSessions";

pub type SessionMap = BTreeMap<String, PaginationSession>;

pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
    /// Held for the whole read-modify-write cycle
    write_lock: Arc<Mutex<()>>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Every persisted session.
    ///
    /// An unreadable record reads as empty and entries that no longer parse
    /// are skipped, each with a warning, rather than failing the whole read.
    pub async fn get_all(&self) -> Result<SessionMap> {
        let mut sessions = SessionMap::new();
        for (key, entry) in self.read_record().await? {
            match serde_json::from_value::<PaginationSession>(entry) {
                Ok(session) => {
                    sessions.insert(key, session);
                }
                Err(e) => tracing::warn!(tab_id = %key, error = %e, "Ignoring malformed session"),
            }
        }

        Ok(sessions)
    }

    pub async fn set_all(&self, sessions: &SessionMap) -> Result<()> {
        self.kv
            .set(SESSIONS_KEY, serde_json::to_value(sessions)?)
            .await?;
        Ok(())
    }

    pub async fn load(&self, tab_id: TabId) -> Result<Option<PaginationSession>> {
        let mut sessions = self.get_all().await?;
        Ok(sessions.remove(&tab_id.storage_key()))
    }

    pub async fn save(&self, tab_id: TabId, session: &PaginationSession) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.read_record().await?;
        entries.insert(tab_id.storage_key(), serde_json::to_value(session)?);
        self.kv.set(SESSIONS_KEY, Value::Object(entries)).await?;

        tracing::debug!(tab_id = %tab_id, rows = session.row_count(), "Saved session");
        Ok(())
    }

    /// Remove the session for `tab_id`. Returns whether one existed.
    pub async fn delete(&self, tab_id: TabId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.read_record().await?;
        let existed = entries.remove(&tab_id.storage_key()).is_some();
        if existed {
            self.kv.set(SESSIONS_KEY, Value::Object(entries)).await?;
            tracing::debug!(tab_id = %tab_id, "Deleted session");
        }

        Ok(existed)
    }

    /// Raw entries of the session record, keyed by tab id.
    ///
    /// `save` and `delete` write these back untouched apart from their own
    /// tab, so an entry that fails to parse is kept for other readers.
    async fn read_record(&self) -> Result<Map<String, Value>> {
        let value = match self.kv.get(SESSIONS_KEY).await {
            Ok(Some(value)) => value,
            Ok(None) => return Ok(Map::new()),
            Err(StorageError::Json(e)) => {
                tracing::warn!(key = SESSIONS_KEY, error = %e, "Ignoring unreadable session record");
                return Ok(Map::new());
            }
            Err(e) => return Err(e.into()),
        };

        match value {
            Value::Object(entries) => Ok(entries),
            _ => {
                tracing::warn!(key = SESSIONS_KEY, "Ignoring malformed session record");
                Ok(Map::new())
            }
        }
    }
}

impl Clone for SessionStore {
    fn clone(&self) -> Self {
        Self {
            kv: Arc::clone(&self.kv),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

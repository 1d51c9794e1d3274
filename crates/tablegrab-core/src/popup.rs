//! Popup state container
//!
//! One `Popup` per popup open. It lists the active tab's tables, exports
//! them, and drives the paginated capture for that tab. Closing the popup
//! drops it; the capture session lives on in storage.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use tablegrab_export::{DirectorySink, ExportError, ExportSink, Exporter, SavedExport};
use tablegrab_provider::{TabId, Table, TableProvider};
use tablegrab_session::{
    CaptureOutcome, CaptureState, PaginationMachine, PaginationSession, SessionStore,
};
use tablegrab_storage::{Database, KeyValueStore, SqliteStore};

use crate::config::Config;
use crate::error::CoreError;
use crate::status::Status;
use crate::Result;

/// One row of the popup's table list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableEntry {
    pub index: usize,
    pub title: String,
    pub summary: String,
}

impl TableEntry {
    fn new(index: usize, table: &Table) -> Self {
        Self {
            index,
            title: table.display_title(index),
            summary: table.summary(),
        }
    }
}

pub struct Popup {
    tab_id: Option<TabId>,
    exporter: Exporter,
    machine: PaginationMachine,
}

impl Popup {
    /// Popup backed by the on-disk store and download directory from `config`.
    pub fn new(config: &Config, tab_id: Option<TabId>, provider: Arc<dyn TableProvider>) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;

        Ok(Self::with_parts(
            tab_id,
            provider,
            Arc::new(SqliteStore::new(db)),
            Arc::new(DirectorySink::new(config.download_dir.clone())),
            config.export_stagger(),
        ))
    }

    pub fn with_parts(
        tab_id: Option<TabId>,
        provider: Arc<dyn TableProvider>,
        kv: Arc<dyn KeyValueStore>,
        sink: Arc<dyn ExportSink>,
        stagger: Duration,
    ) -> Self {
        let exporter = Exporter::with_stagger(sink, stagger);
        let machine = PaginationMachine::new(
            tab_id,
            provider,
            SessionStore::new(kv),
            exporter.clone(),
        );

        Self {
            tab_id,
            exporter,
            machine,
        }
    }

    /// What the popup does when it opens: restore the tab's capture session
    /// and scan the page for tables.
    ///
    /// A page that cannot be scanned is reported in the status but does not
    /// fail the open; a restored session stays usable.
    pub async fn open(&self) -> Result<Status> {
        let state = self.machine.restore().await?;

        let status = match self.machine.refresh_tables().await {
            Ok(tables) => Status::tables_found(tables.len()),
            Err(e) => {
                tracing::warn!(tab_id = ?self.tab_id, error = %e, "Page scan failed");
                Status::from_error(&CoreError::from(e))
            }
        };

        tracing::info!(tab_id = ?self.tab_id, state = %state, "Popup opened");
        Ok(status)
    }

    pub async fn table_entries(&self) -> Vec<TableEntry> {
        self.machine
            .tables()
            .await
            .iter()
            .enumerate()
            .map(|(index, table)| TableEntry::new(index, table))
            .collect()
    }

    // === Export ===

    pub async fn export_table(&self, index: usize) -> Result<SavedExport> {
        let tables = self.machine.tables().await;
        let table = tables.get(index).ok_or(CoreError::TableIndex(index))?;

        Ok(self.exporter.export_table(table, index).await?)
    }

    /// Export every table on the page, one file each.
    ///
    /// Per-table failures are returned in their slot; only an empty page is
    /// an error for the whole call.
    pub async fn export_all(&self) -> Result<Vec<std::result::Result<SavedExport, ExportError>>> {
        let tables = self.machine.tables().await;
        if tables.is_empty() {
            return Err(CoreError::NoTables);
        }

        Ok(self.exporter.export_all_tables(&tables).await)
    }

    // === Paginated capture ===

    pub async fn capture_state(&self) -> CaptureState {
        self.machine.state().await
    }

    pub async fn capture_session(&self) -> Option<PaginationSession> {
        self.machine.session().await
    }

    pub async fn start_capture(&self, index: usize) -> Result<CaptureOutcome> {
        Ok(self.machine.start(index).await?)
    }

    pub async fn capture_page(&self) -> Result<CaptureOutcome> {
        Ok(self.machine.capture_page().await?)
    }

    pub async fn finish_capture(&self) -> Result<SavedExport> {
        Ok(self.machine.finish().await?)
    }

    pub async fn clear_capture(&self) -> Result<bool> {
        Ok(self.machine.clear().await?)
    }

    pub fn exports(&self) -> Vec<SavedExport> {
        self.exporter.saved()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;
    use tablegrab_provider::ProviderError;
    use tablegrab_session::SessionError;
    use tablegrab_storage::MemoryStore;

    /// A page whose tables can be swapped between captures, like
    /// clicking "next page" in the browser.
    struct FakePage {
        tables: Mutex<Option<Vec<Table>>>,
    }

    impl FakePage {
        fn new(tables: Vec<Table>) -> Self {
            Self {
                tables: Mutex::new(Some(tables)),
            }
        }

        fn unreachable() -> Self {
            Self {
                tables: Mutex::new(None),
            }
        }

        fn navigate(&self, tables: Vec<Table>) {
            *self.tables.lock() = Some(tables);
        }
    }

    #[async_trait]
    impl TableProvider for FakePage {
        async fn get_tables(&self, tab_id: TabId) -> tablegrab_provider::Result<Vec<Table>> {
            self.tables
                .lock()
                .clone()
                .ok_or(ProviderError::NoResponse(tab_id))
        }

        async fn get_table(
            &self,
            tab_id: TabId,
            index: usize,
        ) -> tablegrab_provider::Result<Option<Table>> {
            let tables = self.get_tables(tab_id).await?;
            Ok(tables.get(index).cloned())
        }
    }

    fn orders_page(rows: &[[&str; 2]]) -> Vec<Table> {
        let mut data = vec![vec![json!("ID"), json!("Name")]];
        data.extend(rows.iter().map(|r| vec![json!(r[0]), json!(r[1])]));
        vec![
            Table::new(None, vec![vec![json!("Home"), json!("About")]]),
            Table::new(Some("Orders".to_string()), data),
        ]
    }

    fn popup(page: Arc<FakePage>, kv: MemoryStore, dir: &std::path::Path) -> Popup {
        Popup::with_parts(
            Some(TabId::new(3)),
            page,
            Arc::new(kv),
            Arc::new(DirectorySink::new(dir.to_path_buf())),
            Duration::from_millis(1),
        )
    }

    #[tokio::test]
    async fn test_open_lists_tables() {
        let dir = tempfile::tempdir().unwrap();
        let page = Arc::new(FakePage::new(orders_page(&[["1", "Ada"]])));
        let popup = popup(page, MemoryStore::new(), dir.path());

        let status = popup.open().await.unwrap();
        assert_eq!(status.message, "Found 2 tables");

        let entries = popup.table_entries().await;
        assert_eq!(entries[0].title, "Table 1");
        assert_eq!(entries[1].title, "Orders");
        assert_eq!(entries[1].summary, "2 rows × 2 columns");
    }

    #[tokio::test]
    async fn test_open_unreachable_page() {
        let dir = tempfile::tempdir().unwrap();
        let popup = popup(Arc::new(FakePage::unreachable()), MemoryStore::new(), dir.path());

        let status = popup.open().await.unwrap();
        assert!(status.is_error());
        assert!(status.message.contains("Try refreshing"));
        assert!(popup.table_entries().await.is_empty());
        assert!(matches!(popup.export_all().await, Err(CoreError::NoTables)));
    }

    #[tokio::test]
    async fn test_export_single_and_all() {
        let dir = tempfile::tempdir().unwrap();
        let page = Arc::new(FakePage::new(orders_page(&[["1", "Ada"]])));
        let popup = popup(page, MemoryStore::new(), dir.path());
        popup.open().await.unwrap();

        let saved = popup.export_table(1).await.unwrap();
        assert_eq!(saved.file_name, "orders.csv");
        assert_eq!(
            std::fs::read_to_string(&saved.path).unwrap(),
            "ID,Name\n1,Ada"
        );

        assert!(matches!(
            popup.export_table(9).await,
            Err(CoreError::TableIndex(9))
        ));

        let results = popup.export_all().await.unwrap();
        let names: Vec<_> = results
            .iter()
            .map(|r| r.as_ref().unwrap().file_name.clone())
            .collect();
        assert_eq!(names, vec!["table_1.csv", "orders (1).csv"]);
        assert_eq!(popup.exports().len(), 3);
    }

    #[tokio::test]
    async fn test_paginated_capture_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let kv = MemoryStore::new();
        let page = Arc::new(FakePage::new(orders_page(&[["1", "Ada"], ["2", "Bob"]])));

        {
            let popup = popup(page.clone(), kv.clone(), dir.path());
            popup.open().await.unwrap();
            let outcome = popup.start_capture(1).await.unwrap();
            assert_eq!(outcome.report().unwrap().added_rows, 3);
        }

        // User clicks "next" on the page, then reopens the popup
        page.navigate(orders_page(&[["3", "Cy"], ["4", "Di"]]));
        let popup = popup(page, kv, dir.path());
        popup.open().await.unwrap();
        assert_eq!(popup.capture_state().await, CaptureState::Capturing);

        let outcome = popup.capture_page().await.unwrap();
        let report = outcome.report().unwrap();
        assert!(report.skipped_header);
        assert_eq!(report.total_rows, 5);

        let saved = popup.finish_capture().await.unwrap();
        assert_eq!(saved.file_name, "orders_paginated.csv");
        assert_eq!(
            std::fs::read_to_string(&saved.path).unwrap(),
            "ID,Name\n1,Ada\n2,Bob\n3,Cy\n4,Di"
        );

        assert!(popup.clear_capture().await.unwrap());
        assert!(popup.capture_session().await.is_none());
    }

    #[tokio::test]
    async fn test_finish_without_rows() {
        let dir = tempfile::tempdir().unwrap();
        let page = Arc::new(FakePage::new(vec![Table::new(None, vec![])]));
        let popup = popup(page, MemoryStore::new(), dir.path());
        popup.open().await.unwrap();
        popup.start_capture(0).await.unwrap();

        let err = popup.finish_capture().await.unwrap_err();
        assert!(matches!(err, CoreError::Session(SessionError::EmptyExport)));
        assert!(popup.exports().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).map(|d| d.count()).unwrap_or(0), 0);
    }

    #[tokio::test]
    async fn test_open_and_clear_with_unreadable_record() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_in_memory().unwrap();
        db.set_value(tablegrab_session::SESSIONS_KEY, "{truncated").unwrap();

        let page = Arc::new(FakePage::new(orders_page(&[["1", "Ada"]])));
        let popup = Popup::with_parts(
            Some(TabId::new(3)),
            page,
            Arc::new(SqliteStore::new(db)),
            Arc::new(DirectorySink::new(dir.path().to_path_buf())),
            Duration::from_millis(1),
        );

        let status = popup.open().await.unwrap();
        assert_eq!(status.message, "Found 2 tables");
        assert_eq!(popup.capture_state().await, CaptureState::NoSession);
        assert!(!popup.clear_capture().await.unwrap());

        popup.start_capture(1).await.unwrap();
        assert_eq!(popup.capture_session().await.unwrap().row_count(), 2);
    }

    #[tokio::test]
    async fn test_popup_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database_path: dir.path().join("state").join("tablegrab.db"),
            download_dir: dir.path().join("downloads"),
            export_stagger_ms: 0,
        };
        let page = Arc::new(FakePage::new(orders_page(&[["1", "Ada"]])));

        {
            let popup = Popup::new(&config, Some(TabId::new(8)), page.clone()).unwrap();
            popup.open().await.unwrap();
            popup.start_capture(1).await.unwrap();
        }

        let popup = Popup::new(&config, Some(TabId::new(8)), page).unwrap();
        popup.open().await.unwrap();
        let session = popup.capture_session().await.unwrap();
        assert_eq!(session.title, "Orders");
        assert_eq!(session.row_count(), 2);
    }
}

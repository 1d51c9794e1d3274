//! Pagination Machine
//!
//! Owns the capture session of one popup instance. The active tab is fixed
//! at construction; every transition persists through the [`SessionStore`]
//! before the in-memory state changes, so a failed save leaves both as they
//! were.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use tablegrab_export::{CsvDocument, Exporter, SavedExport};
use tablegrab_provider::{ProviderError, TabId, Table, TableProvider};

use crate::error::SessionError;
use crate::session::PaginationSession;
use crate::state::{CaptureAction, CaptureState};
use crate::store::SessionStore;
use crate::Result;

/// Result of merging one page into the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaptureReport {
    pub added_rows: usize,
    pub skipped_header: bool,
    /// Rows in the session after the merge
    pub total_rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CaptureOutcome {
    Applied(CaptureReport),
    /// The session was cleared or replaced while the page was being
    /// fetched; the response was dropped.
    Discarded,
}

impl CaptureOutcome {
    pub fn report(&self) -> Option<&CaptureReport> {
        match self {
            CaptureOutcome::Applied(report) => Some(report),
            CaptureOutcome::Discarded => None,
        }
    }
}

#[derive(Default)]
struct MachineState {
    /// Table list from the last scan of the page
    tables: Vec<Table>,
    session: Option<PaginationSession>,
    /// Bumped whenever `session` is replaced or removed. A capture applies
    /// its page only if the generation it started with is still current.
    generation: u64,
}

impl MachineState {
    fn capture_state(&self) -> CaptureState {
        if self.session.is_some() {
            CaptureState::Capturing
        } else {
            CaptureState::NoSession
        }
    }

    fn check(&self, action: CaptureAction) -> Result<()> {
        let state = self.capture_state();
        if state.allows(action) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                from: state.to_string(),
                to: action.as_str().to_string(),
            })
        }
    }
}

pub struct PaginationMachine {
    tab_id: Option<TabId>,
    provider: Arc<dyn TableProvider>,
    store: SessionStore,
    exporter: Exporter,
    state: Arc<Mutex<MachineState>>,
}

impl PaginationMachine {
    /// `tab_id` is the tab the popup was opened for, if the browser reported one.
    pub fn new(
        tab_id: Option<TabId>,
        provider: Arc<dyn TableProvider>,
        store: SessionStore,
        exporter: Exporter,
    ) -> Self {
        Self {
            tab_id,
            provider,
            store,
            exporter,
            state: Arc::new(Mutex::new(MachineState::default())),
        }
    }

    pub fn tab_id(&self) -> Option<TabId> {
        self.tab_id
    }

    fn require_tab(&self) -> Result<TabId> {
        self.tab_id
            .ok_or_else(|| SessionError::InvalidSelection("no active tab".to_string()))
    }

    /// Load the persisted session for the active tab, replacing whatever is
    /// in memory.
    pub async fn restore(&self) -> Result<CaptureState> {
        let session = match self.tab_id {
            Some(tab_id) => self.store.load(tab_id).await?,
            None => None,
        };

        let mut state = self.state.lock().await;
        state.session = session;
        state.generation += 1;

        if let Some(session) = &state.session {
            tracing::info!(
                tab_id = %session.tab_id,
                title = %session.title,
                rows = session.row_count(),
                "Restored capture session"
            );
        }

        Ok(state.capture_state())
    }

    /// Scan the page for tables and remember the list for `start`.
    pub async fn refresh_tables(&self) -> Result<Vec<Table>> {
        let tab_id = self.require_tab()?;

        let tables = self
            .provider
            .get_tables(tab_id)
            .await
            .map_err(|e| SessionError::CommunicationFailure(e.to_string()))?;

        tracing::info!(tab_id = %tab_id, count = tables.len(), "Scanned page tables");

        self.state.lock().await.tables = tables.clone();
        Ok(tables)
    }

    pub async fn tables(&self) -> Vec<Table> {
        self.state.lock().await.tables.clone()
    }

    pub async fn state(&self) -> CaptureState {
        self.state.lock().await.capture_state()
    }

    pub async fn session(&self) -> Option<PaginationSession> {
        self.state.lock().await.session.clone()
    }

    /// Begin capturing the table at `table_index` of the current table list,
    /// then capture the page currently shown.
    ///
    /// If that first capture fails the session is kept and the error is
    /// returned; the user can retry with [`capture_page`](Self::capture_page).
    pub async fn start(&self, table_index: usize) -> Result<CaptureOutcome> {
        let tab_id = self.require_tab()?;

        {
            let mut state = self.state.lock().await;
            state.check(CaptureAction::Start)?;

            let table = state.tables.get(table_index).ok_or_else(|| {
                SessionError::InvalidSelection(format!("no table {} on this page", table_index + 1))
            })?;

            let session = PaginationSession::new(tab_id, table_index, table.title.as_deref());
            self.store.save(tab_id, &session).await?;

            tracing::info!(
                tab_id = %tab_id,
                table_index,
                title = %session.title,
                "Started capture session"
            );

            state.session = Some(session);
            state.generation += 1;
        }

        self.capture_page().await
    }

    /// Fetch the session's table from the page and merge it in.
    pub async fn capture_page(&self) -> Result<CaptureOutcome> {
        let tab_id = self.require_tab()?;

        let (table_index, generation) = {
            let state = self.state.lock().await;
            state.check(CaptureAction::Capture)?;
            let session = state.session.as_ref().ok_or(SessionError::InvalidTransition {
                from: CaptureState::NoSession.to_string(),
                to: CaptureAction::Capture.as_str().to_string(),
            })?;
            (session.table_index, state.generation)
        };

        // Not holding the lock: clear() must stay possible while we wait
        let table = match self.provider.get_table(tab_id, table_index).await {
            Ok(Some(table)) => table,
            Ok(None) => return Err(SessionError::NoTableFound { index: table_index }),
            Err(e) => return Err(provider_error(e, table_index)),
        };

        let mut state = self.state.lock().await;
        let current = match &state.session {
            Some(session) if state.generation == generation => session,
            _ => {
                tracing::debug!(tab_id = %tab_id, table_index, "Dropping stale capture response");
                return Ok(CaptureOutcome::Discarded);
            }
        };

        let (next, result) = current.with_page(&table.data);
        self.store.save(tab_id, &next).await?;

        let report = CaptureReport {
            added_rows: result.added_rows,
            skipped_header: result.skipped_header,
            total_rows: next.row_count(),
        };
        state.session = Some(next);

        tracing::info!(
            tab_id = %tab_id,
            added_rows = report.added_rows,
            skipped_header = report.skipped_header,
            total_rows = report.total_rows,
            "Captured page"
        );

        Ok(CaptureOutcome::Applied(report))
    }

    /// Export everything captured so far. The session stays active.
    pub async fn finish(&self) -> Result<SavedExport> {
        let document = {
            let state = self.state.lock().await;
            state.check(CaptureAction::Finish)?;

            match &state.session {
                Some(session) if !session.is_empty() => {
                    CsvDocument::paginated(&session.title, &session.data)
                }
                _ => return Err(SessionError::EmptyExport),
            }
        };

        let saved = self.exporter.export_document(&document).await?;

        tracing::info!(file_name = %saved.file_name, bytes = saved.bytes, "Exported capture session");

        Ok(saved)
    }

    /// Drop the session for the active tab. Returns whether one existed.
    pub async fn clear(&self) -> Result<bool> {
        let mut state = self.state.lock().await;

        let persisted = match self.tab_id {
            Some(tab_id) => self.store.delete(tab_id).await?,
            None => false,
        };
        let existed = persisted || state.session.is_some();

        state.session = None;
        state.generation += 1;

        if existed {
            tracing::info!(tab_id = ?self.tab_id, "Cleared capture session");
        }

        Ok(existed)
    }
}

impl Clone for PaginationMachine {
    fn clone(&self) -> Self {
        Self {
            tab_id: self.tab_id,
            provider: Arc::clone(&self.provider),
            store: self.store.clone(),
            exporter: self.exporter.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

fn provider_error(err: ProviderError, table_index: usize) -> SessionError {
    if err.is_communication_failure() {
        SessionError::CommunicationFailure(err.to_string())
    } else {
        tracing::warn!(table_index, error = %err, "Provider returned an unusable table");
        SessionError::NoTableFound { index: table_index }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use parking_lot::Mutex as SyncMutex;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use tablegrab_export::{ExportSink, ExportError};
    use tablegrab_storage::MemoryStore;
    use tokio::sync::Notify;

    type ProviderResult<T> = tablegrab_provider::Result<T>;

    /// Serves a fixed table list and a queue of pages for `get_table`.
    #[derive(Default)]
    struct ScriptedProvider {
        tables: Vec<Table>,
        pages: SyncMutex<VecDeque<ProviderResult<Option<Table>>>>,
        /// When set, `get_table` waits for a notification before answering
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedProvider {
        fn with_tables(tables: Vec<Table>) -> Self {
            Self {
                tables,
                ..Self::default()
            }
        }

        fn push_page(&self, page: ProviderResult<Option<Table>>) {
            self.pages.lock().push_back(page);
        }
    }

    #[async_trait]
    impl TableProvider for ScriptedProvider {
        async fn get_tables(&self, _tab_id: TabId) -> ProviderResult<Vec<Table>> {
            Ok(self.tables.clone())
        }

        async fn get_table(&self, tab_id: TabId, _index: usize) -> ProviderResult<Option<Table>> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.pages
                .lock()
                .pop_front()
                .unwrap_or(Err(ProviderError::NoResponse(tab_id)))
        }
    }

    #[derive(Default)]
    struct MemorySink {
        saved: SyncMutex<Vec<CsvDocument>>,
    }

    #[async_trait]
    impl ExportSink for MemorySink {
        async fn save(&self, document: &CsvDocument) -> tablegrab_export::Result<SavedExport> {
            if document.file_name.is_empty() {
                return Err(ExportError::InvalidFileName(String::new()));
            }
            self.saved.lock().push(document.clone());
            Ok(SavedExport {
                file_name: document.file_name.clone(),
                path: document.file_name.clone().into(),
                mime_type: document.mime_type(),
                bytes: document.len() as u64,
                saved_at: Utc::now(),
            })
        }
    }

    fn rows(rows: &[&[&str]]) -> Vec<Vec<Value>> {
        rows.iter()
            .map(|row| row.iter().map(|c| json!(c)).collect())
            .collect()
    }

    fn page(data: &[&[&str]]) -> ProviderResult<Option<Table>> {
        Ok(Some(Table::new(Some("Orders".to_string()), rows(data))))
    }

    fn page_tables() -> Vec<Table> {
        vec![
            Table::new(Some("Navigation".to_string()), rows(&[&["Home"]])),
            Table::new(Some("Orders".to_string()), rows(&[&["ID", "Name"]])),
        ]
    }

    struct Harness {
        machine: PaginationMachine,
        provider: Arc<ScriptedProvider>,
        sink: Arc<MemorySink>,
        kv: MemoryStore,
    }

    fn harness_with(provider: ScriptedProvider, kv: MemoryStore) -> Harness {
        let provider = Arc::new(provider);
        let sink = Arc::new(MemorySink::default());
        let machine = PaginationMachine::new(
            Some(TabId::new(7)),
            provider.clone(),
            SessionStore::new(Arc::new(kv.clone())),
            Exporter::new(sink.clone()),
        );
        Harness {
            machine,
            provider,
            sink,
            kv,
        }
    }

    fn harness() -> Harness {
        harness_with(
            ScriptedProvider::with_tables(page_tables()),
            MemoryStore::new(),
        )
    }

    #[tokio::test]
    async fn test_start_and_capture_pages() {
        let h = harness();
        h.machine.refresh_tables().await.unwrap();

        h.provider
            .push_page(page(&[&["ID", "Name"], &["1", "Ada"], &["2", "Bob"]]));
        let first = h.machine.start(1).await.unwrap();
        assert_eq!(
            first,
            CaptureOutcome::Applied(CaptureReport {
                added_rows: 3,
                skipped_header: false,
                total_rows: 3,
            })
        );
        assert_eq!(h.machine.state().await, CaptureState::Capturing);

        h.provider
            .push_page(page(&[&["ID", "Name"], &["3", "Cy"], &["4", "Di"]]));
        let second = h.machine.capture_page().await.unwrap();
        let report = second.report().unwrap();
        assert_eq!(report.added_rows, 2);
        assert!(report.skipped_header);
        assert_eq!(report.total_rows, 5);

        let session = h.machine.session().await.unwrap();
        assert_eq!(session.title, "Orders");
        assert_eq!(session.table_index, 1);
        assert_eq!(session.data.len(), 5);
    }

    #[tokio::test]
    async fn test_start_rejections() {
        let h = harness();
        h.machine.refresh_tables().await.unwrap();

        let err = h.machine.start(5).await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidSelection(_)));
        assert_eq!(h.machine.state().await, CaptureState::NoSession);

        h.provider.push_page(page(&[&["ID", "Name"]]));
        h.machine.start(1).await.unwrap();

        let err = h.machine.start(0).await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition { .. }));
        assert_eq!(h.machine.session().await.unwrap().table_index, 1);
    }

    #[tokio::test]
    async fn test_start_without_tab() {
        let machine = PaginationMachine::new(
            None,
            Arc::new(ScriptedProvider::with_tables(page_tables())),
            SessionStore::new(Arc::new(MemoryStore::new())),
            Exporter::new(Arc::new(MemorySink::default())),
        );

        let err = machine.start(0).await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidSelection(_)));
        assert_eq!(machine.restore().await.unwrap(), CaptureState::NoSession);
    }

    #[tokio::test]
    async fn test_failed_first_capture_keeps_session() {
        let h = harness();
        h.machine.refresh_tables().await.unwrap();

        // No page queued: the provider does not answer
        let err = h.machine.start(1).await.unwrap_err();
        assert!(matches!(err, SessionError::CommunicationFailure(_)));
        assert!(err.is_retryable());
        assert_eq!(h.machine.state().await, CaptureState::Capturing);

        h.provider.push_page(page(&[&["ID", "Name"], &["1", "Ada"]]));
        let outcome = h.machine.capture_page().await.unwrap();
        assert_eq!(outcome.report().unwrap().total_rows, 2);
    }

    #[tokio::test]
    async fn test_missing_table_leaves_session() {
        let h = harness();
        h.machine.refresh_tables().await.unwrap();
        h.provider.push_page(page(&[&["ID", "Name"], &["1", "Ada"]]));
        h.machine.start(1).await.unwrap();

        h.provider.push_page(Ok(None));
        let err = h.machine.capture_page().await.unwrap_err();
        assert!(matches!(err, SessionError::NoTableFound { index: 1 }));
        assert_eq!(err.to_string(), "Table 2 not found on this page");

        h.provider.push_page(Err(ProviderError::InvalidResponse {
            tab_id: TabId::new(7),
            message: "ragged".to_string(),
        }));
        let err = h.machine.capture_page().await.unwrap_err();
        assert!(matches!(err, SessionError::NoTableFound { .. }));

        assert_eq!(h.machine.session().await.unwrap().row_count(), 2);
    }

    #[tokio::test]
    async fn test_capture_without_session() {
        let h = harness();
        let err = h.machine.capture_page().await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_finish_exports_and_keeps_session() {
        let h = harness();
        h.machine.refresh_tables().await.unwrap();
        h.provider
            .push_page(page(&[&["ID", "Name"], &["1", "Acme, Inc."]]));
        h.machine.start(1).await.unwrap();

        let saved = h.machine.finish().await.unwrap();
        assert_eq!(saved.file_name, "orders_paginated.csv");
        assert_eq!(saved.mime_type, tablegrab_export::CSV_MIME_TYPE);

        let documents = h.sink.saved.lock().clone();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].contents, "ID,Name\n1,\"Acme, Inc.\"");
        assert_eq!(h.machine.state().await, CaptureState::Capturing);
    }

    #[tokio::test]
    async fn test_finish_with_no_rows() {
        let h = harness();
        h.machine.refresh_tables().await.unwrap();
        h.provider.push_page(Ok(Some(Table::new(None, vec![]))));
        h.machine.start(0).await.unwrap();

        let err = h.machine.finish().await.unwrap_err();
        assert!(matches!(err, SessionError::EmptyExport));
        assert!(h.sink.saved.lock().is_empty());
    }

    #[tokio::test]
    async fn test_finish_without_session() {
        let h = harness();
        let err = h.machine.finish().await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition { .. }));
        assert!(h.sink.saved.lock().is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let h = harness();

        // Nothing to clear
        assert!(!h.machine.clear().await.unwrap());
        assert_eq!(h.machine.state().await, CaptureState::NoSession);

        h.machine.refresh_tables().await.unwrap();
        h.provider.push_page(page(&[&["ID", "Name"]]));
        h.machine.start(1).await.unwrap();

        assert!(h.machine.clear().await.unwrap());
        assert_eq!(h.machine.state().await, CaptureState::NoSession);

        let store = SessionStore::new(Arc::new(h.kv.clone()));
        assert!(store.load(TabId::new(7)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_survives_reopen() {
        let kv = MemoryStore::new();
        {
            let h = harness_with(ScriptedProvider::with_tables(page_tables()), kv.clone());
            h.machine.refresh_tables().await.unwrap();
            h.provider
                .push_page(page(&[&["ID", "Name"], &["1", "Ada"]]));
            h.machine.start(1).await.unwrap();
        }

        let reopened = harness_with(ScriptedProvider::with_tables(page_tables()), kv);
        assert_eq!(reopened.machine.restore().await.unwrap(), CaptureState::Capturing);

        reopened
            .provider
            .push_page(page(&[&["ID", "Name"], &["2", "Bob"]]));
        let report = *reopened.machine.capture_page().await.unwrap().report().unwrap();
        assert_eq!(report.added_rows, 1);
        assert_eq!(report.total_rows, 3);
    }

    #[tokio::test]
    async fn test_clear_during_capture_drops_response() {
        let kv = MemoryStore::new();
        let mut existing = PaginationSession::new(TabId::new(7), 1, Some("Orders"));
        existing.data = rows(&[&["ID", "Name"], &["1", "Ada"]]);
        SessionStore::new(Arc::new(kv.clone()))
            .save(TabId::new(7), &existing)
            .await
            .unwrap();

        let gate = Arc::new(Notify::new());
        let provider = ScriptedProvider {
            tables: page_tables(),
            gate: Some(gate.clone()),
            ..ScriptedProvider::default()
        };
        provider.push_page(page(&[&["ID", "Name"], &["2", "Bob"]]));

        let h = harness_with(provider, kv.clone());
        h.machine.restore().await.unwrap();

        let machine = h.machine.clone();
        let in_flight = tokio::spawn(async move { machine.capture_page().await });
        tokio::task::yield_now().await;

        h.machine.clear().await.unwrap();
        gate.notify_one();

        let outcome = in_flight.await.unwrap().unwrap();
        assert_eq!(outcome, CaptureOutcome::Discarded);
        assert_eq!(h.machine.state().await, CaptureState::NoSession);

        let store = SessionStore::new(Arc::new(kv));
        assert!(store.load(TabId::new(7)).await.unwrap().is_none());
    }
}

//! Exporter
//!
//! Saves single tables, all tables of a page, or any prepared document
//! through an [`ExportSink`], keeping a record of what was saved.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

use tablegrab_provider::Table;

use crate::document::CsvDocument;
use crate::sink::{ExportSink, SavedExport};
use crate::Result;

/// Delay unit between consecutive saves of a bulk export.
pub const DEFAULT_STAGGER: Duration = Duration::from_millis(100);

pub struct Exporter {
    sink: Arc<dyn ExportSink>,
    /// Save `i` of a bulk export starts `stagger * i` after the export begins
    stagger: Duration,
    saved: Arc<RwLock<Vec<SavedExport>>>,
}

impl Exporter {
    pub fn new(sink: Arc<dyn ExportSink>) -> Self {
        Self::with_stagger(sink, DEFAULT_STAGGER)
    }

    pub fn with_stagger(sink: Arc<dyn ExportSink>, stagger: Duration) -> Self {
        Self {
            sink,
            stagger,
            saved: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn export_document(&self, document: &CsvDocument) -> Result<SavedExport> {
        let saved = self.sink.save(document).await?;
        self.saved.write().push(saved.clone());
        Ok(saved)
    }

    /// Export the table at `index` of the page's table list.
    pub async fn export_table(&self, table: &Table, index: usize) -> Result<SavedExport> {
        let document = CsvDocument::for_table(table, index);

        tracing::info!(
            index,
            file_name = %document.file_name,
            rows = table.data.len(),
            "Exporting table"
        );

        self.export_document(&document).await
    }

    /// Export every table, one file each, in list order.
    ///
    /// Saves are staggered by `stagger * index` and run independently: a
    /// failed save is reported in its slot and does not hold back the rest.
    pub async fn export_all_tables(&self, tables: &[Table]) -> Vec<Result<SavedExport>> {
        tracing::info!(count = tables.len(), "Exporting all tables");

        let handles: Vec<_> = tables
            .iter()
            .enumerate()
            .map(|(index, table)| {
                let document = CsvDocument::for_table(table, index);
                let sink = Arc::clone(&self.sink);
                let delay = self.stagger * index as u32;

                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    sink.save(&document).await
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (index, handle) in handles.into_iter().enumerate() {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(e.into()),
            };

            match &result {
                Ok(saved) => self.saved.write().push(saved.clone()),
                Err(e) => tracing::warn!(index, error = %e, "Table export failed"),
            }
            results.push(result);
        }

        results
    }

    /// Everything saved through this exporter, oldest first
    pub fn saved(&self) -> Vec<SavedExport> {
        self.saved.read().clone()
    }
}

impl Clone for Exporter {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            stagger: self.stagger,
            saved: Arc::clone(&self.saved),
        }
    }
}

//! tablegrab Core
//!
//! Coordination layer behind the popup: lists the active tab's tables,
//! exports them as CSV, and runs the paginated capture that accumulates one
//! table across several pages.

mod config;
mod error;
mod popup;
mod status;

pub use config::Config;
pub use error::CoreError;
pub use popup::{Popup, TableEntry};
pub use status::{Status, StatusKind};

// Re-export core components
pub use tablegrab_export::{
    sanitize, CsvDocument, DirectorySink, ExportError, ExportSink, Exporter, SavedExport,
    CSV_MIME_TYPE,
};
pub use tablegrab_provider::{
    MessageChannel, MessagingProvider, ProviderError, TabId, Table, TableProvider, TableRequest,
    TableResponse, TablesResponse,
};
pub use tablegrab_session::{
    merge, CaptureOutcome, CaptureReport, CaptureState, MergeResult, PaginationMachine,
    PaginationSession, SessionError, SessionStore,
};
pub use tablegrab_storage::{Database, KeyValueStore, MemoryStore, SqliteStore, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
///
/// Logs go to stderr so command output on stdout stays clean.
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

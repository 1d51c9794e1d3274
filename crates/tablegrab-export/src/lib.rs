//! tablegrab Export
//!
//! Turns table rows into CSV documents and saves them:
//! - CSV encoding that any standard reader decodes back to the same cells
//! - File names derived from table titles
//! - Staggered bulk export so the download handler is not flooded

pub mod csv;
mod document;
mod error;
mod exporter;
pub mod filename;
mod sink;

pub use document::{CsvDocument, CSV_MIME_TYPE};
pub use error::ExportError;
pub use exporter::{Exporter, DEFAULT_STAGGER};
pub use filename::sanitize;
pub use sink::{DirectorySink, ExportSink, SavedExport};

pub type Result<T> = std::result::Result<T, ExportError>;

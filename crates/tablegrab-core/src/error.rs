//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] tablegrab_storage::StorageError),

    #[error(transparent)]
    Session(#[from] tablegrab_session::SessionError),

    #[error("Export error: {0}")]
    Export(#[from] tablegrab_export::ExportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No tables found on this page")]
    NoTables,

    #[error("Table {} not found on this page", .0 + 1)]
    TableIndex(usize),
}

//! Export error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),
}

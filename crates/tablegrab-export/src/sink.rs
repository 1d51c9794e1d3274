//! Export sinks
//!
//! A sink is wherever finished documents end up. In the browser that is the
//! download handler; here it is a download directory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::document::CsvDocument;
use crate::error::ExportError;
use crate::Result;

/// Give up looking for a free `name (n).csv` after this many attempts.
const MAX_NAME_ATTEMPTS: usize = 1000;

#[derive(Debug, Clone, Serialize)]
pub struct SavedExport {
    pub file_name: String,
    pub path: PathBuf,
    /// Content type the file was saved as
    pub mime_type: &'static str,
    pub bytes: u64,
    pub saved_at: DateTime<Utc>,
}

#[async_trait]
pub trait ExportSink: Send + Sync {
    async fn save(&self, document: &CsvDocument) -> Result<SavedExport>;
}

/// Writes documents into a directory, never overwriting an existing file.
///
/// A name clash is resolved the way browsers resolve download clashes:
/// `orders.csv`, `orders (1).csv`, `orders (2).csv`, …
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

#[async_trait]
impl ExportSink for DirectorySink {
    async fn save(&self, document: &CsvDocument) -> Result<SavedExport> {
        validate_file_name(&document.file_name)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let file_name = numbered_name(&document.file_name, attempt);
            let path = self.dir.join(&file_name);

            let mut file = match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            };

            file.write_all(document.contents.as_bytes()).await?;
            file.flush().await?;

            tracing::info!(path = %path.display(), bytes = document.len(), "Saved export");

            return Ok(SavedExport {
                file_name,
                path,
                mime_type: document.mime_type(),
                bytes: document.len() as u64,
                saved_at: Utc::now(),
            });
        }

        Err(ExportError::InvalidFileName(format!(
            "no free name for {} in {}",
            document.file_name,
            self.dir.display()
        )))
    }
}

fn validate_file_name(file_name: &str) -> Result<()> {
    let valid = !file_name.is_empty()
        && Path::new(file_name).file_name().and_then(|n| n.to_str()) == Some(file_name);

    if valid {
        Ok(())
    } else {
        Err(ExportError::InvalidFileName(file_name.to_string()))
    }
}

fn numbered_name(file_name: &str, attempt: usize) -> String {
    if attempt == 0 {
        return file_name.to_string();
    }

    match file_name.rsplit_once('.') {
        Some((stem, ext)) => format!("{} ({}).{}", stem, attempt, ext),
        None => format!("{} ({})", file_name, attempt),
    }
}

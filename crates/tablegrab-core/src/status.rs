//! Status line shown under the popup's table list

use serde::Serialize;

use tablegrab_export::SavedExport;
use tablegrab_session::{CaptureOutcome, PaginationSession};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

impl Status {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }

    pub fn from_error(err: &CoreError) -> Self {
        Self::error(format!("Error: {}", err))
    }

    pub fn tables_found(count: usize) -> Self {
        match count {
            0 => Self::error("No tables found on this page"),
            1 => Self::success("Found 1 table"),
            n => Self::success(format!("Found {} tables", n)),
        }
    }

    pub fn captured(outcome: &CaptureOutcome) -> Self {
        match outcome.report() {
            Some(report) => {
                let header = if report.skipped_header {
                    " (repeated header skipped)"
                } else {
                    ""
                };
                Self::success(format!(
                    "Captured {} row{}{}. {} rows total.",
                    report.added_rows,
                    plural(report.added_rows),
                    header,
                    report.total_rows
                ))
            }
            None => Self::info("Capture cancelled"),
        }
    }

    pub fn exported(saved: &SavedExport) -> Self {
        Self::success(format!("Exported {}", saved.file_name))
    }

    pub fn session(session: Option<&PaginationSession>) -> Self {
        match session {
            Some(session) => Self::info(format!(
                "Capturing \"{}\": {} row{} so far",
                session.title,
                session.row_count(),
                plural(session.row_count())
            )),
            None => Self::info("No capture in progress"),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

//! Row merging across pages
//!
//! Paginated tables usually repeat their header on every page. Appending
//! pages blindly would duplicate it once per page, so a new page whose first
//! row equals the accumulated header has that row dropped.

use serde::Serialize;
use tablegrab_provider::Row;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeResult {
    pub merged: Vec<Row>,
    pub added_rows: usize,
    pub skipped_header: bool,
}

/// Combine accumulated rows with a newly captured page.
///
/// Rows are compared by value. Neither input is modified.
pub fn merge(existing: &[Row], incoming: &[Row]) -> MergeResult {
    let Some(first) = incoming.first() else {
        return MergeResult {
            merged: existing.to_vec(),
            added_rows: 0,
            skipped_header: false,
        };
    };

    let skipped_header = existing.first() == Some(first);
    let appended = if skipped_header { &incoming[1..] } else { incoming };

    let mut merged = Vec::with_capacity(existing.len() + appended.len());
    merged.extend_from_slice(existing);
    merged.extend_from_slice(appended);

    MergeResult {
        merged,
        added_rows: appended.len(),
        skipped_header,
    }
}

//! Browser tab identifier

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier the browser assigns to a tab.
///
/// Persisted mappings key sessions by the decimal string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(i64);

impl TabId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Key used for this tab in string-keyed storage maps
    pub fn storage_key(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TabId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(TabId)
            .map_err(|_| format!("Invalid tab id: {}", s))
    }
}

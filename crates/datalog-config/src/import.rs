//! Import behavior: row retrieval strategy and timeout.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const fn default_timeout_ms() -> u64 {
    30_000
}

/// How row data is fetched from storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowRetrieval {
    /// Read only the data table item by id.
    #[default]
    Item,
    /// Read the whole object and pick the data table item out of it.
    Object,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImportConfig {
    /// Upper bound on row retrieval, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub retrieval: RowRetrieval,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            retrieval: RowRetrieval::default(),
        }
    }
}

impl ImportConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

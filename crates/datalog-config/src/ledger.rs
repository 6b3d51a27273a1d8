//! Import ledger seeding.

use serde::{Deserialize, Serialize};

/// Where the set of already-imported object ids comes from at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerSeed {
    /// Scan the host's live items for identity markers.
    #[default]
    HostScan,
    /// Restore the set persisted in the host's interactive state, and persist
    /// it again after every import.
    InteractiveState,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub seed: LedgerSeed,
}

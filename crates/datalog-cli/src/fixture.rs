//! Session fixtures: stored objects plus their item payloads in one JSON file.

use std::path::Path;

use anyhow::Context;
use datalog_core::objects::StoredObject;
use datalog_plugin::memory::MemoryStorage;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Source id used when neither the command line nor the configuration names
/// one.
pub const DEFAULT_SOURCE: &str = "fixture";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Fixture {
    /// Stored objects in the order storage lists them.
    #[serde(default)]
    pub objects: Vec<StoredObject>,
    /// Item payloads keyed by object id, then item id.
    #[serde(default)]
    pub data: IndexMap<String, IndexMap<String, Value>>,
}

impl Fixture {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid fixture {}", path.display()))
    }

    /// Put everything into `storage` under `source_id`.
    pub fn seed(&self, storage: &MemoryStorage, source_id: &str) {
        for object in &self.objects {
            storage.put_object(source_id, object.clone());
        }
        for (object_id, items) in &self.data {
            for (item_id, payload) in items {
                storage.put_item(object_id, item_id, payload.clone());
            }
        }
        tracing::debug!(
            source_id,
            objects = self.objects.len(),
            "fixture loaded into storage"
        );
    }
}

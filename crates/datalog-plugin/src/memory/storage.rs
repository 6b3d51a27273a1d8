use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use datalog_core::host::ObjectStorageConfig;
use datalog_core::objects::StoredObject;
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::StorageError;
use crate::storage::{ObjectStorage, ObjectStorageFactory, SnapshotHandler, StoredObjectData};
use crate::subscription::Subscription;

type SharedHandler = Arc<dyn Fn(Vec<StoredObject>) + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum ReadMode {
    #[default]
    Normal,
    Stall,
    Fail,
}

#[derive(Default)]
struct StorageState {
    /// Objects per source id, in insertion order.
    sources: HashMap<String, IndexMap<String, StoredObject>>,
    /// Item payloads per object id, in insertion order.
    items: HashMap<String, IndexMap<String, Value>>,
    reads: HashMap<(String, String), usize>,
    mode: ReadMode,
    next_monitor: u64,
    monitors: HashMap<u64, (String, SharedHandler)>,
}

/// Object storage kept in memory.
///
/// Monitors receive the current snapshot as soon as they subscribe and a new
/// one after every change to their source.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<StorageState>>,
}

impl std::fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MemoryStorage")
            .field("sources", &state.sources.len())
            .field("monitors", &state.monitors.len())
            .finish_non_exhaustive()
    }
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or replace an object under `source_id`. A replaced object keeps
    /// its position.
    pub fn put_object(&self, source_id: &str, object: StoredObject) {
        self.state
            .lock()
            .sources
            .entry(source_id.to_string())
            .or_default()
            .insert(object.id.clone(), object);
        self.publish(source_id);
    }

    pub fn remove_object(&self, source_id: &str, object_id: &str) {
        let removed = self
            .state
            .lock()
            .sources
            .get_mut(source_id)
            .and_then(|objects| objects.shift_remove(object_id))
            .is_some();
        if removed {
            self.publish(source_id);
        }
    }

    /// Store an item payload.
    pub fn put_item(&self, object_id: &str, item_id: &str, payload: Value) {
        self.state
            .lock()
            .items
            .entry(object_id.to_string())
            .or_default()
            .insert(item_id.to_string(), payload);
    }

    /// How many times `read_data_item` was called for this item.
    #[must_use]
    pub fn item_reads(&self, object_id: &str, item_id: &str) -> usize {
        self.state
            .lock()
            .reads
            .get(&(object_id.to_string(), item_id.to_string()))
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn monitor_count(&self) -> usize {
        self.state.lock().monitors.len()
    }

    /// Make every later read hang forever.
    pub fn stall_reads(&self) {
        self.state.lock().mode = ReadMode::Stall;
    }

    /// Make every later read fail.
    pub fn fail_reads(&self) {
        self.state.lock().mode = ReadMode::Fail;
    }

    fn snapshot(state: &StorageState, source_id: &str) -> Vec<StoredObject> {
        state
            .sources
            .get(source_id)
            .map(|objects| objects.values().cloned().collect())
            .unwrap_or_default()
    }

    fn publish(&self, source_id: &str) {
        let (objects, handlers) = {
            let state = self.state.lock();
            let handlers: Vec<SharedHandler> = state
                .monitors
                .values()
                .filter(|(source, _)| source == source_id)
                .map(|(_, h)| Arc::clone(h))
                .collect();
            (Self::snapshot(&state, source_id), handlers)
        };
        for handler in handlers {
            handler(objects.clone());
        }
    }

    async fn gate(&self) -> Result<(), StorageError> {
        let mode = self.state.lock().mode;
        match mode {
            ReadMode::Normal => Ok(()),
            ReadMode::Stall => std::future::pending().await,
            ReadMode::Fail => Err(StorageError::Read("storage unavailable".into())),
        }
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    fn monitor(&self, source_id: &str, handler: SnapshotHandler) -> Subscription {
        let handler: SharedHandler = Arc::from(handler);
        let (id, objects) = {
            let mut state = self.state.lock();
            state.next_monitor += 1;
            let id = state.next_monitor;
            state
                .monitors
                .insert(id, (source_id.to_string(), Arc::clone(&handler)));
            (id, Self::snapshot(&state, source_id))
        };
        handler(objects);

        let state = Arc::clone(&self.state);
        Subscription::new(move || {
            state.lock().monitors.remove(&id);
        })
    }

    async fn read_data_item(
        &self,
        object_id: &str,
        item_id: &str,
    ) -> Result<Option<Value>, StorageError> {
        *self
            .state
            .lock()
            .reads
            .entry((object_id.to_string(), item_id.to_string()))
            .or_default() += 1;
        self.gate().await?;
        Ok(self
            .state
            .lock()
            .items
            .get(object_id)
            .and_then(|items| items.get(item_id))
            .cloned())
    }

    async fn read_object(&self, object_id: &str) -> Result<Option<StoredObjectData>, StorageError> {
        self.gate().await?;
        Ok(self
            .state
            .lock()
            .items
            .get(object_id)
            .map(|items| StoredObjectData {
                id: object_id.to_string(),
                data: items.clone(),
            }))
    }
}

/// Hands out the same [`MemoryStorage`] for every config.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorageFactory {
    storage: MemoryStorage,
}

impl MemoryStorageFactory {
    #[must_use]
    pub const fn new(storage: MemoryStorage) -> Self {
        Self { storage }
    }
}

impl ObjectStorageFactory for MemoryStorageFactory {
    fn create(&self, config: &ObjectStorageConfig) -> Result<Arc<dyn ObjectStorage>, StorageError> {
        tracing::debug!(?config, "opening in-memory object storage");
        Ok(Arc::new(self.storage.clone()))
    }
}

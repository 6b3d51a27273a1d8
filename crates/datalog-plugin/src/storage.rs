//! The object-storage collaborator.
//!
//! Persistence, change transport and retries all belong to the storage
//! layer. The plugin only monitors a session's objects and reads items.

use std::sync::Arc;

use async_trait::async_trait;
use datalog_config::RowRetrieval;
use datalog_core::host::ObjectStorageConfig;
use datalog_core::objects::StoredObject;
use indexmap::IndexMap;

use crate::error::StorageError;
use crate::subscription::Subscription;

/// Callback invoked with the full object list every time it changes.
pub type SnapshotHandler = Box<dyn Fn(Vec<StoredObject>) + Send + Sync>;

/// Item payloads of one object, keyed by item id in manifest order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredObjectData {
    pub id: String,
    pub data: IndexMap<String, serde_json::Value>,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Subscribe to the objects stored for `source_id`.
    fn monitor(&self, source_id: &str, handler: SnapshotHandler) -> Subscription;

    /// Read a single item's payload.
    async fn read_data_item(
        &self,
        object_id: &str,
        item_id: &str,
    ) -> Result<Option<serde_json::Value>, StorageError>;

    /// Read every item payload of an object.
    async fn read_object(&self, object_id: &str)
    -> Result<Option<StoredObjectData>, StorageError>;
}

/// Builds storage handles from the config the host hands out.
pub trait ObjectStorageFactory: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Config` if the config is unusable.
    fn create(&self, config: &ObjectStorageConfig) -> Result<Arc<dyn ObjectStorage>, StorageError>;
}

/// What the catalog is subscribed to. A change of binding means a new
/// subscription; an equal binding keeps the existing one.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageBinding {
    pub config: ObjectStorageConfig,
    pub source_id: String,
}

/// Fetch the payload of `item_id` with the configured strategy.
///
/// # Errors
///
/// Returns `StorageError` if the storage layer fails.
pub async fn read_item(
    storage: &dyn ObjectStorage,
    strategy: RowRetrieval,
    object_id: &str,
    item_id: &str,
) -> Result<Option<serde_json::Value>, StorageError> {
    match strategy {
        RowRetrieval::Item => storage.read_data_item(object_id, item_id).await,
        RowRetrieval::Object => Ok(storage
            .read_object(object_id)
            .await?
            .and_then(|mut object| object.data.shift_remove(item_id))),
    }
}

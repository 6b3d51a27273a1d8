//! Object Catalog: the ordered list of importable tables for the bound session.
//!
//! The catalog owns the storage monitor subscription. Each snapshot replaces
//! the whole list; entries keep their identity across rebuilds through their
//! object id only.

use std::sync::Arc;

use datalog_core::objects::StoredObject;

use crate::normalizer::{CatalogEntry, normalize_snapshot};
use crate::storage::{ObjectStorage, StorageBinding};
use crate::subscription::Subscription;

/// Receives `(generation, objects)` for every snapshot of the current
/// subscription.
pub type SnapshotSink = Arc<dyn Fn(u64, Vec<StoredObject>) + Send + Sync>;

#[derive(Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    loaded: bool,
    generation: u64,
    binding: Option<StorageBinding>,
    subscription: Option<Subscription>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `binding`, replacing any previous subscription.
    ///
    /// Does nothing and returns `false` when already bound to an equal
    /// binding, so repeated calls never re-subscribe. Passing `None` tears
    /// the subscription down.
    pub fn bind(
        &mut self,
        binding: Option<(StorageBinding, &dyn ObjectStorage)>,
        sink: &SnapshotSink,
    ) -> bool {
        let unchanged = match (&binding, &self.binding) {
            (Some((next, _)), Some(current)) => next == current,
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return false;
        }

        // Old subscription goes first so at most one is ever live.
        self.subscription = None;
        self.generation += 1;
        self.binding = None;

        if let Some((binding, storage)) = binding {
            let generation = self.generation;
            let sink = Arc::clone(sink);
            let subscription = storage.monitor(
                &binding.source_id,
                Box::new(move |objects| sink(generation, objects)),
            );
            tracing::info!(source_id = %binding.source_id, generation, "monitoring stored objects");
            self.subscription = Some(subscription);
            self.binding = Some(binding);
        } else {
            tracing::info!("stopped monitoring stored objects");
        }
        true
    }

    /// Rebuild from a snapshot. Snapshots from a superseded subscription are
    /// ignored and `false` is returned.
    pub fn apply_snapshot(&mut self, generation: u64, objects: &[StoredObject]) -> bool {
        if generation != self.generation || self.binding.is_none() {
            tracing::debug!(generation, current = self.generation, "dropping stale snapshot");
            return false;
        }
        self.entries = normalize_snapshot(objects);
        self.loaded = true;
        tracing::debug!(
            objects = objects.len(),
            tables = self.entries.len(),
            "catalog rebuilt"
        );
        true
    }

    /// Drop the subscription.
    pub fn unbind(&mut self) {
        self.subscription = None;
        self.binding = None;
        self.generation += 1;
    }

    #[must_use]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, object_id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.object_id() == object_id)
    }

    /// Whether at least one snapshot has been applied.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    #[must_use]
    pub const fn binding(&self) -> Option<&StorageBinding> {
        self.binding.as_ref()
    }

    #[must_use]
    pub const fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }
}

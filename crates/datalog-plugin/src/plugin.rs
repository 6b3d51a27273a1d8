//! The plugin event loop.
//!
//! Collaborator callbacks never touch plugin state. Storage snapshots and host
//! notifications are turned into [`PluginEvent`]s on one queue, together with
//! user actions, and applied one at a time by [`DatalogPlugin`].

use std::sync::Arc;

use datalog_config::DatalogConfig;
use datalog_core::host::HostNotification;
use datalog_core::objects::StoredObject;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::catalog::{Catalog, SnapshotSink};
use crate::error::{ImportError, PluginError};
use crate::executor::{ImportExecutor, ImportReport};
use crate::handshake;
use crate::highlight::highlight_data_set;
use crate::host::HostClient;
use crate::ledger::ImportLedger;
use crate::selection::Selection;
use crate::storage::{ObjectStorage, ObjectStorageFactory, StorageBinding};
use crate::subscription::Subscription;
use crate::thumbnails::Thumbnails;

#[derive(Debug, Clone)]
pub enum PluginEvent {
    /// A storage snapshot from subscription `generation`.
    Snapshot {
        generation: u64,
        objects: Vec<StoredObject>,
    },
    HostNotification(HostNotification),
    /// The user picked a list entry.
    Select(String),
    /// The user pressed "Get Data".
    GetData,
    Shutdown,
}

/// Sends user actions into a running plugin.
#[derive(Debug, Clone)]
pub struct PluginHandle {
    tx: mpsc::UnboundedSender<PluginEvent>,
}

impl PluginHandle {
    pub fn select(&self, object_id: impl Into<String>) {
        self.send(PluginEvent::Select(object_id.into()));
    }

    pub fn get_data(&self) {
        self.send(PluginEvent::GetData);
    }

    pub fn shutdown(&self) {
        self.send(PluginEvent::Shutdown);
    }

    fn send(&self, event: PluginEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("plugin already stopped");
        }
    }
}

/// What the list view shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PluginView {
    Fatal {
        message: String,
    },
    Initializing,
    NoData,
    Ready {
        entries: Vec<EntryView>,
        get_data_enabled: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        alert: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryView {
    pub object_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub selected: bool,
    pub imported: bool,
}

pub struct DatalogPlugin {
    config: DatalogConfig,
    host: Arc<dyn HostClient>,
    factory: Arc<dyn ObjectStorageFactory>,
    storage: Option<Arc<dyn ObjectStorage>>,
    catalog: Catalog,
    ledger: ImportLedger,
    executor: ImportExecutor,
    selection: Selection,
    thumbnails: Thumbnails,
    fatal: Option<String>,
    alert: Option<String>,
    last_report: Option<ImportReport>,
    notify_subscription: Option<Subscription>,
    tx: mpsc::UnboundedSender<PluginEvent>,
    /// Collaborator callbacks only hold this, so they never keep the queue
    /// open on their own.
    weak_tx: mpsc::WeakUnboundedSender<PluginEvent>,
    rx: mpsc::UnboundedReceiver<PluginEvent>,
}

impl DatalogPlugin {
    #[must_use]
    pub fn new(
        config: DatalogConfig,
        host: Arc<dyn HostClient>,
        factory: Arc<dyn ObjectStorageFactory>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let weak_tx = tx.downgrade();
        let ledger = ImportLedger::new(config.ledger.seed, config.workspace.clone());
        let executor = ImportExecutor::new(config.workspace.clone(), config.import.clone());
        Self {
            config,
            host,
            factory,
            storage: None,
            catalog: Catalog::new(),
            ledger,
            executor,
            selection: Selection::default(),
            thumbnails: Thumbnails::new(),
            fatal: None,
            alert: None,
            last_report: None,
            notify_subscription: None,
            tx,
            weak_tx,
            rx,
        }
    }

    #[must_use]
    pub fn handle(&self) -> PluginHandle {
        PluginHandle {
            tx: self.tx.clone(),
        }
    }

    /// Handshake, seed the ledger, and start both subscriptions.
    ///
    /// A handshake failure switches the view to its fatal message and stops
    /// initialization.
    ///
    /// # Errors
    ///
    /// Returns `PluginError::Handshake` or `PluginError::Storage`.
    pub async fn start(&mut self) -> Result<(), PluginError> {
        let binding = match handshake::connect(self.host.as_ref(), &self.config).await {
            Ok(binding) => binding,
            Err(e) => {
                self.fatal = Some(e.to_string());
                return Err(e.into());
            }
        };

        if let Err(e) = self.ledger.initialize(self.host.as_ref()).await {
            tracing::warn!(error = %e, "could not seed import ledger");
        }

        let tx = self.weak_tx.clone();
        let resource = self.config.workspace.child_resource("case");
        self.notify_subscription = Some(self.host.on_notify(
            &resource,
            Box::new(move |msg| {
                if let Some(tx) = tx.upgrade() {
                    let _ = tx.send(PluginEvent::HostNotification(msg));
                }
            }),
        ));

        self.bind_storage(Some(binding))
    }

    /// Point the catalog at a storage binding, or detach it with `None`.
    ///
    /// A storage handle is created only when the binding actually changes.
    ///
    /// # Errors
    ///
    /// Returns `PluginError::Storage` if the factory rejects the config; the
    /// view then shows the error as fatal.
    pub fn bind_storage(&mut self, binding: Option<StorageBinding>) -> Result<(), PluginError> {
        let tx = self.weak_tx.clone();
        let sink: SnapshotSink = Arc::new(move |generation, objects| {
            if let Some(tx) = tx.upgrade() {
                let _ = tx.send(PluginEvent::Snapshot {
                    generation,
                    objects,
                });
            }
        });

        let Some(binding) = binding else {
            self.catalog.bind(None, &sink);
            self.storage = None;
            return Ok(());
        };
        if self.catalog.binding() == Some(&binding) && self.storage.is_some() {
            return Ok(());
        }

        let storage = match self.factory.create(&binding.config) {
            Ok(storage) => storage,
            Err(e) => {
                self.fatal = Some(e.to_string());
                return Err(e.into());
            }
        };
        self.catalog.bind(Some((binding, storage.as_ref())), &sink);
        self.storage = Some(storage);
        Ok(())
    }

    /// Run until shutdown or until every [`PluginHandle`] is dropped.
    ///
    /// Subscriptions are released either way.
    pub async fn run(mut self) {
        // From here on only handles keep the queue open.
        let (closed, _) = mpsc::unbounded_channel();
        drop(std::mem::replace(&mut self.tx, closed));

        while let Some(event) = self.rx.recv().await {
            if !self.handle_event(event).await {
                break;
            }
        }
        self.teardown();
    }

    /// Apply every event queued so far. Returns how many were applied.
    pub async fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.rx.try_recv() {
            applied += 1;
            if !self.handle_event(event).await {
                self.teardown();
                break;
            }
        }
        applied
    }

    /// Apply one event. Returns `false` once the plugin should stop.
    pub async fn handle_event(&mut self, event: PluginEvent) -> bool {
        match event {
            PluginEvent::Snapshot {
                generation,
                objects,
            } => self.on_snapshot(generation, &objects).await,
            PluginEvent::HostNotification(msg) => {
                if let Err(e) = self
                    .ledger
                    .on_host_notification(self.host.as_ref(), &msg)
                    .await
                {
                    tracing::warn!(error = %e, "ledger reconciliation failed");
                }
            }
            PluginEvent::Select(object_id) => self.on_select(object_id).await,
            PluginEvent::GetData => self.on_get_data().await,
            PluginEvent::Shutdown => return false,
        }
        true
    }

    async fn on_snapshot(&mut self, generation: u64, objects: &[StoredObject]) {
        if !self.catalog.apply_snapshot(generation, objects) {
            return;
        }
        if let Some(storage) = &self.storage {
            self.thumbnails
                .refresh(storage.as_ref(), self.catalog.entries())
                .await;
        }
    }

    async fn on_select(&mut self, object_id: String) {
        self.selection.select(object_id);
        if let Some(entry) = self.selection.resolve(&self.catalog) {
            highlight_data_set(self.host.as_ref(), &self.config.workspace, entry.name()).await;
        }
    }

    async fn on_get_data(&mut self) {
        let Some(selected) = self.selection.object_id() else {
            return;
        };
        let Some(storage) = &self.storage else {
            return;
        };

        let result = self
            .executor
            .import_selected(
                self.host.as_ref(),
                storage.as_ref(),
                &self.ledger,
                &self.catalog,
                Some(selected),
            )
            .await;

        match result {
            Ok(report) => {
                self.alert = None;
                self.last_report = Some(report);
            }
            Err(
                e @ (ImportError::AlreadyImported { .. } | ImportError::AlreadyInFlight { .. }),
            ) => {
                tracing::debug!(error = %e, "import refused");
            }
            Err(e) => {
                tracing::warn!(error = %e, "import failed");
                self.alert = Some(e.to_string());
            }
        }
    }

    fn teardown(&mut self) {
        self.catalog.unbind();
        self.notify_subscription = None;
        tracing::debug!("plugin stopped");
    }

    /// Whether "Get Data" is currently actionable.
    #[must_use]
    pub fn get_data_enabled(&self) -> bool {
        self.selection.resolve(&self.catalog).is_some_and(|entry| {
            !self.ledger.contains(entry.object_id())
                && !self.executor.is_in_flight(entry.object_id())
        })
    }

    #[must_use]
    pub fn view(&self) -> PluginView {
        if let Some(message) = &self.fatal {
            return PluginView::Fatal {
                message: message.clone(),
            };
        }
        if !self.catalog.is_loaded() {
            return PluginView::Initializing;
        }
        if self.catalog.entries().is_empty() {
            return PluginView::NoData;
        }

        let entries = self
            .catalog
            .entries()
            .iter()
            .map(|entry| EntryView {
                object_id: entry.object_id().to_string(),
                name: entry.name().to_string(),
                thumbnail_url: self.thumbnails.url(entry.object_id()).map(str::to_string),
                selected: self.selection.is_selected(entry.object_id()),
                imported: self.ledger.contains(entry.object_id()),
            })
            .collect();
        PluginView::Ready {
            entries,
            get_data_enabled: self.get_data_enabled(),
            alert: self.alert.clone(),
        }
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn ledger(&self) -> &ImportLedger {
        &self.ledger
    }

    #[must_use]
    pub const fn last_report(&self) -> Option<&ImportReport> {
        self.last_report.as_ref()
    }

    #[must_use]
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }
}

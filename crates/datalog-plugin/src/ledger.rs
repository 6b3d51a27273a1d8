//! Import Ledger: which objects already have records in the host workspace.
//!
//! The host's live data is the source of truth. Users can edit or delete
//! imported cases at any time, so the ledger is reconciled from host
//! notifications:
//!
//! - `create` / `update`: identity markers in the affected cases are added.
//! - `delete`: a delete payload does not say which objects lost their last
//!   record, so the whole set is recomputed from a full item scan.

use std::collections::{BTreeSet, HashSet};

use datalog_config::{LedgerSeed, WorkspaceConfig};
use datalog_core::host::{HostNotification, InteractiveState, NotifyAction, text_value};
use parking_lot::Mutex;

use crate::error::HostError;
use crate::host::{HostClient, api};

#[derive(Debug)]
pub struct ImportLedger {
    imported: Mutex<HashSet<String>>,
    seed: LedgerSeed,
    workspace: WorkspaceConfig,
}

impl ImportLedger {
    #[must_use]
    pub fn new(seed: LedgerSeed, workspace: WorkspaceConfig) -> Self {
        Self {
            imported: Mutex::new(HashSet::new()),
            seed,
            workspace,
        }
    }

    /// Seed the ledger at startup according to the configured strategy.
    ///
    /// # Errors
    ///
    /// Returns `HostError` if the host cannot be read.
    pub async fn initialize(&self, host: &dyn HostClient) -> Result<(), HostError> {
        match self.seed {
            LedgerSeed::HostScan => self.rescan(host).await,
            LedgerSeed::InteractiveState => {
                let state = match host.get_interactive_state().await? {
                    Some(raw) => serde_json::from_value::<InteractiveState>(raw).map_err(|e| {
                        HostError::Malformed {
                            resource: "interactiveState".into(),
                            reason: e.to_string(),
                        }
                    })?,
                    None => InteractiveState::default(),
                };
                let count = state.imported_data_table_ids.len();
                *self.imported.lock() = state.imported_data_table_ids.into_iter().collect();
                tracing::debug!(count, "ledger restored from interactive state");
                Ok(())
            }
        }
    }

    #[must_use]
    pub fn contains(&self, object_id: &str) -> bool {
        self.imported.lock().contains(object_id)
    }

    /// Imported ids, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.imported
            .lock()
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Mark an object imported. With interactive-state seeding the updated
    /// set is persisted before this returns.
    ///
    /// # Errors
    ///
    /// Returns `HostError` if persisting fails. The id stays recorded.
    pub async fn record_import(
        &self,
        host: &dyn HostClient,
        object_id: &str,
    ) -> Result<(), HostError> {
        self.imported.lock().insert(object_id.to_string());
        self.persist(host).await
    }

    /// Recompute the set from the host's current items.
    ///
    /// If the host cannot list items the set is left as it was.
    ///
    /// # Errors
    ///
    /// Returns `HostError` on transport failure.
    pub async fn rescan(&self, host: &dyn HostClient) -> Result<(), HostError> {
        let Some(items) = api::get_all_items(host, &self.workspace).await? else {
            if api::data_context_exists(host, &self.workspace).await? {
                tracing::warn!(
                    data_context = %self.workspace.data_context,
                    "item scan failed; keeping previous ledger"
                );
            } else {
                tracing::debug!(
                    data_context = %self.workspace.data_context,
                    "no data context yet; nothing imported"
                );
            }
            return Ok(());
        };
        let found: HashSet<String> = items
            .iter()
            .filter_map(|item| item.text(&self.workspace.identity_attribute))
            .map(str::to_string)
            .collect();
        tracing::debug!(items = items.len(), imported = found.len(), "ledger rescanned");
        *self.imported.lock() = found;
        self.persist(host).await
    }

    /// Reconcile with one host change notification.
    ///
    /// # Errors
    ///
    /// Returns `HostError` if a rescan or persist fails.
    pub async fn on_host_notification(
        &self,
        host: &dyn HostClient,
        notification: &HostNotification,
    ) -> Result<(), HostError> {
        match notification.action {
            NotifyAction::Create | NotifyAction::Update => {
                let added = {
                    let mut imported = self.imported.lock();
                    notification
                        .values
                        .cases
                        .iter()
                        .filter_map(|case| text_value(&case.values, &self.workspace.identity_attribute))
                        .filter(|id| imported.insert((*id).to_string()))
                        .count()
                };
                if added > 0 {
                    self.persist(host).await?;
                }
                Ok(())
            }
            NotifyAction::Delete => self.rescan(host).await,
            NotifyAction::Other => Ok(()),
        }
    }

    async fn persist(&self, host: &dyn HostClient) -> Result<(), HostError> {
        if self.seed != LedgerSeed::InteractiveState {
            return Ok(());
        }
        let state = InteractiveState {
            imported_data_table_ids: self.ids(),
        };
        let value = serde_json::to_value(&state).map_err(|e| HostError::Malformed {
            resource: "interactiveState".into(),
            reason: e.to_string(),
        })?;
        host.update_interactive_state(value).await
    }
}

//! Import Executor: the only write path into the host workspace.
//!
//! One import runs these steps strictly in order:
//!
//! ```text
//! resolve → fetch rows → ensure data context → create items → show table
//!         → highlight → record in ledger
//! ```
//!
//! Imports are at-least-once and not atomic. A failure after the items were
//! written leaves them in the host and the object is not recorded; no step is
//! rolled back.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use datalog_config::{ImportConfig, WorkspaceConfig};
use datalog_core::tables::{DataTableData, ImportableDataTable};
use parking_lot::Mutex;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::error::ImportError;
use crate::highlight::highlight_data_set;
use crate::host::{HostClient, api};
use crate::ledger::ImportLedger;
use crate::records::{data_context_definition, materialize};
use crate::storage::{ObjectStorage, read_item};

/// Outcome of a completed import.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub object_id: String,
    pub name: String,
    pub records: usize,
    /// Whether this import had to create the data context.
    pub created_data_context: bool,
    /// Ids selected in the host afterwards, if highlighting worked.
    pub highlighted: Option<Vec<u64>>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ImportExecutor {
    workspace: WorkspaceConfig,
    config: ImportConfig,
    in_flight: Mutex<HashSet<String>>,
}

/// Holds an object's in-flight slot until dropped.
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<String>>,
    object_id: String,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(set: &'a Mutex<HashSet<String>>, object_id: &str) -> Option<Self> {
        set.lock().insert(object_id.to_string()).then(|| Self {
            set,
            object_id: object_id.to_string(),
        })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.lock().remove(&self.object_id);
    }
}

impl ImportExecutor {
    #[must_use]
    pub fn new(workspace: WorkspaceConfig, config: ImportConfig) -> Self {
        Self {
            workspace,
            config,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    #[must_use]
    pub fn is_in_flight(&self, object_id: &str) -> bool {
        self.in_flight.lock().contains(object_id)
    }

    /// Import the currently selected catalog entry.
    ///
    /// # Errors
    ///
    /// `NothingSelected` / `UnknownObject` if the selection does not resolve,
    /// otherwise whatever [`Self::import`] reports.
    pub async fn import_selected(
        &self,
        host: &dyn HostClient,
        storage: &dyn ObjectStorage,
        ledger: &ImportLedger,
        catalog: &Catalog,
        selected: Option<&str>,
    ) -> Result<ImportReport, ImportError> {
        let object_id = selected.ok_or(ImportError::NothingSelected)?;
        let table = catalog
            .get(object_id)
            .map(|entry| entry.table.clone())
            .ok_or_else(|| ImportError::UnknownObject {
                object_id: object_id.to_string(),
            })?;
        self.import(host, storage, ledger, &table).await
    }

    /// Import one table.
    ///
    /// # Errors
    ///
    /// - `AlreadyImported` / `AlreadyInFlight` before anything is read.
    /// - `Timeout`, `MissingDataTable`, `Storage`, `Payload` before anything
    ///   is written.
    /// - `Host` from any write step; earlier writes stay in place.
    pub async fn import(
        &self,
        host: &dyn HostClient,
        storage: &dyn ObjectStorage,
        ledger: &ImportLedger,
        table: &ImportableDataTable,
    ) -> Result<ImportReport, ImportError> {
        let object_id = table.object_id.as_str();
        if ledger.contains(object_id) {
            return Err(ImportError::AlreadyImported {
                object_id: object_id.to_string(),
            });
        }
        let _guard = InFlightGuard::acquire(&self.in_flight, object_id).ok_or_else(|| {
            ImportError::AlreadyInFlight {
                object_id: object_id.to_string(),
            }
        })?;

        let data = self.fetch_rows(storage, table).await?;

        let created_data_context = self.ensure_data_context(host, &table.columns).await?;

        let items = materialize(&self.workspace, table, &data);
        let records = items.len();
        api::create_items(host, &self.workspace, items).await?;
        api::create_table(host, &self.workspace).await?;

        let highlighted = highlight_data_set(host, &self.workspace, &table.name).await;

        ledger.record_import(host, object_id).await?;

        tracing::info!(object_id, name = %table.name, records, "import complete");
        Ok(ImportReport {
            object_id: object_id.to_string(),
            name: table.name.clone(),
            records,
            created_data_context,
            highlighted,
            completed_at: Utc::now(),
        })
    }

    async fn fetch_rows(
        &self,
        storage: &dyn ObjectStorage,
        table: &ImportableDataTable,
    ) -> Result<DataTableData, ImportError> {
        let object_id = table.object_id.as_str();
        let read = read_item(
            storage,
            self.config.retrieval,
            object_id,
            &table.data_table_item_id,
        );
        let raw = tokio::time::timeout(self.config.timeout(), read)
            .await
            .map_err(|_| ImportError::Timeout {
                object_id: object_id.to_string(),
            })??;

        match raw {
            None | Some(serde_json::Value::Null) => Err(ImportError::MissingDataTable {
                object_id: object_id.to_string(),
            }),
            Some(raw) => Ok(DataTableData::from_value(raw)?),
        }
    }

    /// Create the data context unless it already exists. Returns whether it
    /// was created.
    async fn ensure_data_context(
        &self,
        host: &dyn HostClient,
        columns: &[String],
    ) -> Result<bool, ImportError> {
        if api::data_context_exists(host, &self.workspace).await? {
            return Ok(false);
        }
        api::create_data_context(host, data_context_definition(&self.workspace, columns)).await?;
        tracing::info!(data_context = %self.workspace.data_context, "created data context");
        Ok(true)
    }
}

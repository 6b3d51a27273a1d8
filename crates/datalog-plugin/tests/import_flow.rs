//! Import executor against in-memory collaborators.

use datalog_config::{ImportConfig, LedgerSeed, RowRetrieval, WorkspaceConfig};
use datalog_core::tables::ImportableDataTable;
use datalog_plugin::ImportError;
use datalog_plugin::executor::ImportExecutor;
use datalog_plugin::ledger::ImportLedger;
use datalog_plugin::memory::{MemoryHost, MemoryStorage};
use pretty_assertions::assert_eq;
use serde_json::json;

fn sheep_table(object_id: &str, name: &str) -> ImportableDataTable {
    ImportableDataTable {
        name: name.into(),
        object_id: object_id.into(),
        data_table_item_id: "t1".into(),
        columns: vec!["time".into(), "sheep".into()],
    }
}

fn sheep_storage() -> MemoryStorage {
    let storage = MemoryStorage::new();
    storage.put_item("A", "t1", json!({"rows": {"0": [0, 10], "1": [10, 15]}}));
    storage.put_item("B", "t1", json!({"rows": [[0, 3]]}));
    storage
}

fn executor(config: ImportConfig) -> ImportExecutor {
    ImportExecutor::new(WorkspaceConfig::default(), config)
}

fn ledger() -> ImportLedger {
    ImportLedger::new(LedgerSeed::HostScan, WorkspaceConfig::default())
}

#[tokio::test]
async fn sheep_import_end_to_end() {
    let host = MemoryHost::new();
    let storage = sheep_storage();
    let ledger = ledger();
    let ws = WorkspaceConfig::default();

    let report = executor(ImportConfig::default())
        .import(&host, &storage, &ledger, &sheep_table("A", "Sheep Run 1"))
        .await
        .unwrap();

    assert_eq!(report.records, 2);
    assert!(report.created_data_context);
    assert_eq!(report.highlighted, Some(vec![1, 2]));

    let values: Vec<_> = host
        .items(&ws.data_context)
        .into_iter()
        .map(|item| serde_json::Value::Object(item.values))
        .collect();
    assert_eq!(
        values,
        vec![
            json!({"time": 0, "sheep": 10, "name": "Sheep Run 1", "__objectId": "A"}),
            json!({"time": 10, "sheep": 15, "name": "Sheep Run 1", "__objectId": "A"}),
        ]
    );
    assert_eq!(
        host.tables(),
        vec![json!({"type": "caseTable", "dataContext": "DatalogPluginData"})]
    );
    assert_eq!(host.selection(&ws.data_context), vec![1, 2]);
    assert!(ledger.contains("A"));
}

#[tokio::test]
async fn second_import_reuses_existing_schema() {
    let host = MemoryHost::new();
    let storage = sheep_storage();
    let ledger = ledger();
    let executor = executor(ImportConfig::default());

    executor
        .import(&host, &storage, &ledger, &sheep_table("A", "Sheep Run 1"))
        .await
        .unwrap();
    let second = executor
        .import(&host, &storage, &ledger, &sheep_table("B", "Sheep Run 2"))
        .await
        .unwrap();

    assert!(!second.created_data_context);
    assert_eq!(host.data_contexts_created(), 1);
    assert_eq!(second.highlighted, Some(vec![3]));
    assert_eq!(ledger.ids(), vec!["A", "B"]);
}

#[tokio::test]
async fn imported_object_is_refused() {
    let host = MemoryHost::new();
    let storage = sheep_storage();
    let ledger = ledger();
    let executor = executor(ImportConfig::default());
    let table = sheep_table("A", "Sheep Run 1");

    executor.import(&host, &storage, &ledger, &table).await.unwrap();
    let err = executor
        .import(&host, &storage, &ledger, &table)
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::AlreadyImported { .. }));
    assert_eq!(host.items("DatalogPluginData").len(), 2);
}

#[tokio::test]
async fn concurrent_import_of_same_object_is_refused() {
    let host = MemoryHost::new();
    let storage = sheep_storage();
    storage.stall_reads();
    let ledger = ledger();
    let executor = executor(ImportConfig {
        timeout_ms: 50,
        ..ImportConfig::default()
    });
    let table = sheep_table("A", "Sheep Run 1");

    let (first, second) = tokio::join!(
        executor.import(&host, &storage, &ledger, &table),
        async {
            tokio::task::yield_now().await;
            executor.import(&host, &storage, &ledger, &table).await
        }
    );

    assert!(matches!(first, Err(ImportError::Timeout { .. })));
    assert!(matches!(second, Err(ImportError::AlreadyInFlight { .. })));
    assert!(!executor.is_in_flight("A"));
}

#[tokio::test]
async fn stalled_storage_times_out_without_writes() {
    let host = MemoryHost::new();
    let storage = sheep_storage();
    storage.stall_reads();
    let ledger = ledger();

    let err = executor(ImportConfig {
        timeout_ms: 20,
        ..ImportConfig::default()
    })
    .import(&host, &storage, &ledger, &sheep_table("A", "Sheep Run 1"))
    .await
    .unwrap_err();

    assert!(matches!(err, ImportError::Timeout { .. }));
    assert!(host.items("DatalogPluginData").is_empty());
    assert!(!ledger.contains("A"));
}

#[tokio::test]
async fn missing_payload_is_reported() {
    let host = MemoryHost::new();
    let storage = MemoryStorage::new();
    let ledger = ledger();

    let err = executor(ImportConfig::default())
        .import(&host, &storage, &ledger, &sheep_table("A", "Sheep Run 1"))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "The selected object does not contain a data table item."
    );
    assert_eq!(host.data_contexts_created(), 0);
}

#[tokio::test]
async fn whole_object_retrieval_reads_no_single_items() {
    let host = MemoryHost::new();
    let storage = sheep_storage();
    let ledger = ledger();

    let report = executor(ImportConfig {
        retrieval: RowRetrieval::Object,
        ..ImportConfig::default()
    })
    .import(&host, &storage, &ledger, &sheep_table("A", "Sheep Run 1"))
    .await
    .unwrap();

    assert_eq!(report.records, 2);
    assert_eq!(storage.item_reads("A", "t1"), 0);
}

#[tokio::test]
async fn rejected_table_leaves_items_and_skips_ledger() {
    let host = MemoryHost::new();
    host.fail_resource("component");
    let storage = sheep_storage();
    let ledger = ledger();

    let err = executor(ImportConfig::default())
        .import(&host, &storage, &ledger, &sheep_table("A", "Sheep Run 1"))
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::Host(_)));
    assert_eq!(host.items("DatalogPluginData").len(), 2);
    assert!(!ledger.contains("A"));
}

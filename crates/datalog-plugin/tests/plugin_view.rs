//! The plugin event loop driven through its handle.

use std::sync::Arc;
use std::time::Duration;

use datalog_config::{DatalogConfig, WorkspaceConfig};
use datalog_core::host::{HostAction, PluginDimensions, text_value};
use datalog_core::objects::StoredObject;
use datalog_plugin::memory::{MemoryHost, MemoryStorage, MemoryStorageFactory};
use datalog_plugin::records::data_context_definition;
use datalog_plugin::{DatalogPlugin, HandshakeError, PluginError, PluginView};
use pretty_assertions::assert_eq;
use serde_json::json;

const SOURCE: &str = "interactive_1";
const DATA_CONTEXT: &str = "DatalogPluginData";

fn config() -> DatalogConfig {
    let mut config = DatalogConfig::default();
    config.source.data_source_interactive = Some(SOURCE.into());
    config
}

fn sheep(id: &str, name: &str) -> StoredObject {
    StoredObject::new(
        id,
        json!({
            "version": 1,
            "type": "typed",
            "name": name,
            "items": {
                "t1": {"type": "dataTable", "cols": ["time", "sheep"]},
                "img": {"type": "image", "subType": "thumbnail"}
            }
        }),
    )
}

struct Harness {
    host: MemoryHost,
    storage: MemoryStorage,
    plugin: DatalogPlugin,
}

fn harness(host: MemoryHost) -> Harness {
    let storage = MemoryStorage::new();
    let plugin = DatalogPlugin::new(
        config(),
        Arc::new(host.clone()),
        Arc::new(MemoryStorageFactory::new(storage.clone())),
    );
    Harness {
        host,
        storage,
        plugin,
    }
}

fn ready_harness() -> Harness {
    let h = harness(MemoryHost::with_storage_config(json!({"app": "demo"})));
    h.storage.put_object(SOURCE, sheep("A", "Sheep Run 1"));
    h.storage.put_object(SOURCE, sheep("B", "Sheep Run 2"));
    h.storage
        .put_item("A", "t1", json!({"rows": {"0": [0, 10], "1": [10, 15]}}));
    h.storage
        .put_item("A", "img", json!({"url": "https://example.test/a.png"}));
    h
}

fn entries(view: &PluginView) -> Vec<(String, bool, bool)> {
    match view {
        PluginView::Ready { entries, .. } => entries
            .iter()
            .map(|e| (e.object_id.clone(), e.selected, e.imported))
            .collect(),
        _ => Vec::new(),
    }
}

fn get_data_enabled(view: &PluginView) -> bool {
    matches!(
        view,
        PluginView::Ready {
            get_data_enabled: true,
            ..
        }
    )
}

#[tokio::test]
async fn initializing_until_first_snapshot() {
    let h = ready_harness();
    assert_eq!(h.plugin.view(), PluginView::Initializing);
}

#[tokio::test]
async fn handshake_failure_is_fatal() {
    let mut h = harness(MemoryHost::new());
    let err = h.plugin.start().await.unwrap_err();
    assert!(matches!(
        err,
        PluginError::Handshake(HandshakeError::ApiUnreachable)
    ));
    assert_eq!(
        h.plugin.view(),
        PluginView::Fatal {
            message: HandshakeError::ApiUnreachable.to_string()
        }
    );
    assert_eq!(h.storage.monitor_count(), 0);
}

#[tokio::test]
async fn empty_session_shows_no_data() {
    let mut h = harness(MemoryHost::with_storage_config(json!({})));
    h.plugin.start().await.unwrap();
    h.plugin.process_pending().await;
    assert_eq!(h.plugin.view(), PluginView::NoData);
}

#[tokio::test]
async fn lists_tables_with_thumbnails() {
    let mut h = ready_harness();
    h.plugin.start().await.unwrap();
    h.plugin.process_pending().await;

    let PluginView::Ready { entries, get_data_enabled, alert } = h.plugin.view() else {
        panic!("expected ready view");
    };
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Sheep Run 1", "Sheep Run 2"]);
    assert_eq!(
        entries[0].thumbnail_url.as_deref(),
        Some("https://example.test/a.png")
    );
    assert_eq!(entries[1].thumbnail_url, None);
    assert!(!get_data_enabled);
    assert_eq!(alert, None);
}

#[tokio::test]
async fn get_data_imports_and_disables_button() {
    let mut h = ready_harness();
    h.plugin.start().await.unwrap();
    let handle = h.plugin.handle();
    h.plugin.process_pending().await;

    handle.select("A");
    h.plugin.process_pending().await;
    assert!(get_data_enabled(&h.plugin.view()));

    handle.get_data();
    h.plugin.process_pending().await;

    let view = h.plugin.view();
    assert_eq!(
        entries(&view),
        vec![("A".into(), true, true), ("B".into(), false, false)]
    );
    assert!(!get_data_enabled(&view));
    assert_eq!(h.host.items(DATA_CONTEXT).len(), 2);
    assert_eq!(h.plugin.last_report().map(|r| r.records), Some(2));
}

#[tokio::test]
async fn selecting_highlights_imported_rows() {
    let mut h = ready_harness();
    h.plugin.start().await.unwrap();
    let handle = h.plugin.handle();
    h.plugin.process_pending().await;

    handle.select("A");
    handle.get_data();
    handle.select("B");
    h.plugin.process_pending().await;
    assert_eq!(h.host.selection(DATA_CONTEXT), Vec::<u64>::new());

    handle.select("A");
    h.plugin.process_pending().await;
    assert_eq!(h.host.selection(DATA_CONTEXT), vec![1, 2]);
}

#[tokio::test]
async fn missing_rows_raise_an_alert() {
    let mut h = ready_harness();
    h.plugin.start().await.unwrap();
    let handle = h.plugin.handle();
    h.plugin.process_pending().await;

    handle.select("B");
    handle.get_data();
    h.plugin.process_pending().await;

    assert_eq!(
        h.plugin.alert(),
        Some("The selected object does not contain a data table item.")
    );
    assert!(get_data_enabled(&h.plugin.view()));
}

#[tokio::test]
async fn external_delete_clears_imported_flag() {
    let mut h = ready_harness();
    h.plugin.start().await.unwrap();
    let handle = h.plugin.handle();
    h.plugin.process_pending().await;
    handle.select("A");
    handle.get_data();
    h.plugin.process_pending().await;
    assert!(h.plugin.ledger().contains("A"));

    h.host.delete_items_where(DATA_CONTEXT, |values| {
        text_value(values, "__objectId") == Some("A")
    });
    h.plugin.process_pending().await;

    assert!(!h.plugin.ledger().contains("A"));
    assert!(get_data_enabled(&h.plugin.view()));
}

#[tokio::test]
async fn user_created_cases_mark_objects_imported() {
    let mut h = ready_harness();
    h.plugin.start().await.unwrap();
    h.plugin.process_pending().await;

    let mut values = serde_json::Map::new();
    values.insert("__objectId".into(), json!("B"));
    h.host.seed_items(DATA_CONTEXT, vec![values]);
    h.plugin.process_pending().await;

    assert!(h.plugin.ledger().contains("B"));
}

#[tokio::test]
async fn removed_selection_goes_stale() {
    let mut h = ready_harness();
    h.plugin.start().await.unwrap();
    let handle = h.plugin.handle();
    h.plugin.process_pending().await;
    handle.select("B");
    h.plugin.process_pending().await;

    h.storage.remove_object(SOURCE, "B");
    h.plugin.process_pending().await;

    let view = h.plugin.view();
    assert_eq!(entries(&view), vec![("A".into(), false, false)]);
    assert!(!get_data_enabled(&view));
}

#[tokio::test]
async fn shutdown_releases_subscriptions() {
    let mut h = ready_harness();
    h.plugin.start().await.unwrap();
    assert_eq!(h.storage.monitor_count(), 1);
    assert_eq!(h.host.subscriber_count(), 1);

    h.plugin.handle().shutdown();
    h.plugin.process_pending().await;

    assert_eq!(h.storage.monitor_count(), 0);
    assert_eq!(h.host.subscriber_count(), 0);
}

#[tokio::test]
async fn handshake_announces_frame_before_reading_the_api() {
    let mut h = ready_harness();
    h.plugin.start().await.unwrap();

    assert_eq!(
        h.host.dimensions(),
        Some(PluginDimensions {
            width: 300,
            height: 400
        })
    );
    assert_eq!(h.host.frame_cannot_close(), Some(true));
    let calls: Vec<(HostAction, String)> = h
        .host
        .requests()
        .into_iter()
        .take(2)
        .map(|r| (r.action, r.resource))
        .collect();
    assert_eq!(
        calls,
        vec![
            (HostAction::Update, "interactiveFrame".to_string()),
            (HostAction::Get, "interactiveApi".to_string()),
        ]
    );
}

#[tokio::test]
async fn first_import_creates_the_data_context() {
    let mut h = ready_harness();
    h.plugin.start().await.unwrap();
    let handle = h.plugin.handle();
    h.plugin.process_pending().await;
    assert_eq!(h.host.data_context(DATA_CONTEXT), None);

    handle.select("A");
    handle.get_data();
    h.plugin.process_pending().await;

    let columns = vec!["time".to_string(), "sheep".to_string()];
    assert_eq!(
        h.host.data_context(DATA_CONTEXT),
        Some(data_context_definition(&WorkspaceConfig::default(), &columns))
    );
}

#[tokio::test]
async fn unbinding_storage_stops_monitoring() {
    let mut h = ready_harness();
    h.plugin.start().await.unwrap();
    let handle = h.plugin.handle();
    h.plugin.process_pending().await;
    assert_eq!(h.storage.monitor_count(), 1);

    h.plugin.bind_storage(None).unwrap();
    assert_eq!(h.storage.monitor_count(), 0);

    // Later storage changes no longer reach the catalog.
    h.storage.put_object(SOURCE, sheep("C", "Sheep Run 3"));
    h.plugin.process_pending().await;
    assert!(h.plugin.catalog().get("C").is_none());

    // Nothing to import from once detached.
    handle.select("A");
    handle.get_data();
    h.plugin.process_pending().await;
    assert!(h.host.items(DATA_CONTEXT).is_empty());
    assert!(!h.plugin.ledger().contains("A"));
}

#[tokio::test]
async fn run_stops_on_shutdown() {
    let mut h = ready_harness();
    h.plugin.start().await.unwrap();
    let handle = h.plugin.handle();
    let task = tokio::spawn(h.plugin.run());

    handle.select("A");
    handle.get_data();
    handle.shutdown();

    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("run should return after shutdown")
        .unwrap();
    assert_eq!(h.host.items(DATA_CONTEXT).len(), 2);
    assert_eq!(h.storage.monitor_count(), 0);
    assert_eq!(h.host.subscriber_count(), 0);
}

#[tokio::test]
async fn run_stops_once_every_handle_is_dropped() {
    let mut h = ready_harness();
    h.plugin.start().await.unwrap();
    let handle = h.plugin.handle();
    let second = handle.clone();
    let task = tokio::spawn(h.plugin.run());

    handle.select("A");
    drop(handle);
    drop(second);

    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("run should return once handles are gone")
        .unwrap();
    assert_eq!(h.storage.monitor_count(), 0);
    assert_eq!(h.host.subscriber_count(), 0);
}

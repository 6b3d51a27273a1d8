use std::sync::Arc;

use anyhow::{Context, bail};
use datalog_core::host::HostItem;
use datalog_plugin::DatalogPlugin;
use datalog_plugin::executor::ImportReport;
use datalog_plugin::memory::{MemoryHost, MemoryStorage, MemoryStorageFactory};
use serde::Serialize;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ImportArgs;
use crate::commands::load_config;
use crate::fixture::Fixture;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ImportOutput {
    report: ImportReport,
    items: Vec<HostItem>,
}

/// Handle `datalog import`.
///
/// Runs a whole plugin session against an in-memory host: handshake, first
/// catalog snapshot, selection, then "Get Data".
pub async fn handle(args: &ImportArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let config = load_config(flags)?;
    let fixture = Fixture::load(&args.fixture)?;
    let source_id = config
        .source
        .source_id()
        .context("no interactive source configured")?
        .to_string();
    let data_context = config.workspace.data_context.clone();

    let storage = MemoryStorage::new();
    fixture.seed(&storage, &source_id);
    let host = MemoryHost::with_storage_config(json!({
        "fixture": args.fixture.display().to_string()
    }));

    let mut plugin = DatalogPlugin::new(
        config,
        Arc::new(host.clone()),
        Arc::new(MemoryStorageFactory::new(storage)),
    );
    plugin.start().await?;
    let handle = plugin.handle();
    plugin.process_pending().await;

    handle.select(args.object.clone());
    handle.get_data();
    plugin.process_pending().await;

    if let Some(alert) = plugin.alert() {
        bail!("{alert}");
    }
    let Some(report) = plugin.last_report().cloned() else {
        bail!("object {} was not imported", args.object);
    };

    handle.shutdown();
    plugin.process_pending().await;

    output(
        &ImportOutput {
            report,
            items: host.items(&data_context),
        },
        flags.format,
    )
}

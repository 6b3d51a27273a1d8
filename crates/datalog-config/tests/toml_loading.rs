//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for sandboxed env vars and working directory.

use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use datalog_config::{DatalogConfig, LedgerSeed, RowRetrieval};
use pretty_assertions::assert_eq;

#[test]
fn loads_workspace_and_import_sections() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[workspace]
data_context = "SheepData"
title = "Sheep"

[import]
timeout_ms = 500
retrieval = "object"

[ledger]
seed = "interactive_state"
"#,
        )?;

        let config: DatalogConfig = Figment::from(Serialized::defaults(DatalogConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.workspace.data_context, "SheepData");
        assert_eq!(config.workspace.title, "Sheep");
        assert_eq!(config.workspace.parent_collection, "datasets");
        assert_eq!(config.import.timeout_ms, 500);
        assert_eq!(config.import.retrieval, RowRetrieval::Object);
        assert_eq!(config.ledger.seed, LedgerSeed::InteractiveState);
        Ok(())
    });
}

#[test]
fn project_config_file_is_picked_up() {
    Jail::expect_with(|jail| {
        jail.create_dir(".datalog")?;
        jail.create_file(
            ".datalog/config.toml",
            r#"
[source]
data_source_interactive = "interactive_42"
"#,
        )?;

        let config = DatalogConfig::load().expect("config loads");
        assert_eq!(config.source.source_id(), Some("interactive_42"));
        Ok(())
    });
}

#[test]
fn invalid_project_value_is_reported() {
    Jail::expect_with(|jail| {
        jail.create_dir(".datalog")?;
        jail.create_file(
            ".datalog/config.toml",
            r#"
[import]
timeout_ms = 0
"#,
        )?;

        let err = DatalogConfig::load().unwrap_err();
        assert!(err.to_string().contains("timeout_ms"));
        Ok(())
    });
}

#[test]
fn unknown_retrieval_strategy_fails_extraction() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[import]
retrieval = "sideways"
"#,
        )?;

        let result: Result<DatalogConfig, _> =
            Figment::from(Serialized::defaults(DatalogConfig::default()))
                .merge(Toml::file("config.toml"))
                .extract();
        assert!(result.is_err());
        Ok(())
    });
}

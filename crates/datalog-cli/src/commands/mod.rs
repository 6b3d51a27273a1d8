use datalog_config::DatalogConfig;

use crate::cli::{Commands, GlobalFlags};
use crate::fixture::DEFAULT_SOURCE;

mod catalog;
mod import;
mod schema;

pub async fn dispatch(command: Commands, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Catalog(args) => catalog::handle(&args, flags),
        Commands::Import(args) => import::handle(&args, flags).await,
        Commands::Schema => schema::handle(flags),
    }
}

/// Layered configuration with the command-line source id applied on top.
fn load_config(flags: &GlobalFlags) -> anyhow::Result<DatalogConfig> {
    let mut config = DatalogConfig::load_with_dotenv()?;
    if let Some(source) = &flags.source {
        config.source.data_source_interactive = Some(source.clone());
    }
    if config.source.source_id().is_none() {
        config.source.data_source_interactive = Some(DEFAULT_SOURCE.to_string());
    }
    config.validate()?;
    Ok(config)
}

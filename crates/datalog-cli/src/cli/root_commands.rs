use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// List the importable data tables in a fixture.
    Catalog(CatalogArgs),
    /// Import one object from a fixture into an in-memory workspace.
    Import(ImportArgs),
    /// Print the JSON schema of the fixture format.
    Schema,
}

#[derive(Clone, Debug, Args)]
pub struct CatalogArgs {
    /// Fixture file with stored objects and item data.
    pub fixture: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct ImportArgs {
    /// Fixture file with stored objects and item data.
    pub fixture: PathBuf,

    /// Id of the object to import.
    #[arg(long)]
    pub object: String,
}

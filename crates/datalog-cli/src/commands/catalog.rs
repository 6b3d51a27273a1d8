use datalog_plugin::normalizer::normalize_snapshot;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::CatalogArgs;
use crate::fixture::Fixture;
use crate::output::output;

/// Handle `datalog catalog`.
pub fn handle(args: &CatalogArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let fixture = Fixture::load(&args.fixture)?;
    let entries = normalize_snapshot(&fixture.objects);
    tracing::debug!(
        objects = fixture.objects.len(),
        tables = entries.len(),
        "catalog built"
    );
    output(&entries, flags.format)
}

use crate::cli::GlobalFlags;
use crate::fixture::Fixture;
use crate::output::output;

/// Handle `datalog schema`.
pub fn handle(flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = schemars::schema_for!(Fixture);
    output(&schema, flags.format)
}

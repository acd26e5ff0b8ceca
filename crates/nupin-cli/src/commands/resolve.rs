//! `nupin resolve` command implementation.

use super::{parse_identifier, CommandContext};

/// Execute the `nupin resolve` command
pub fn execute(id: &str, range: Option<&str>, ctx: &CommandContext) -> anyhow::Result<()> {
    let requested = parse_identifier(id, range)?;
    let manager = ctx.open_manager()?;
    let resolution = manager.resolve(&requested)?;

    ctx.output.heading(&format!(
        "Plan for {} ({} packages, {}ms)",
        requested, resolution.package_count, resolution.resolution_time_ms
    ));
    for (step, package) in resolution.plan.iter().enumerate() {
        ctx.output.item(&format!("{}. {} [{}]", step + 1, package.record, package.source));
    }
    Ok(())
}

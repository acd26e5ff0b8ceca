//! `nupin uninstall` and `nupin uninstall-all` command implementations.

use anyhow::bail;
use nupin_install::UninstallResult;

use super::{parse_identifier, CommandContext};

/// Execute the `nupin uninstall` command
pub fn execute(id: &str, with_dependencies: bool, ctx: &CommandContext) -> anyhow::Result<()> {
    let requested = parse_identifier(id, None)?;
    let mut manager = ctx.open_manager()?;
    if !manager.installed().contains(requested.id()) {
        ctx.output.info(&format!("{} is not installed", id));
        return Ok(());
    }

    let result = manager.uninstall(&requested, with_dependencies)?;
    manager.close()?;
    report(&result, ctx)
}

/// Execute the `nupin uninstall-all` command
pub fn execute_all(ctx: &CommandContext) -> anyhow::Result<()> {
    let mut manager = ctx.open_manager()?;
    let result = manager.uninstall_all()?;
    manager.close()?;
    report(&result, ctx)
}

fn report(result: &UninstallResult, ctx: &CommandContext) -> anyhow::Result<()> {
    for record in &result.removed {
        ctx.output.success(&format!("Removed {}", record));
    }
    for failure in &result.failed {
        ctx.output.warn(&format!("Could not remove {}: {}", failure.record, failure.error));
    }

    if !result.is_complete() {
        bail!("{} packages could not be removed and are still installed", result.failed.len());
    }
    Ok(())
}

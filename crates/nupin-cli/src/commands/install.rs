//! `nupin install` command implementation.

use super::{parse_identifier, CommandContext};

/// Execute the `nupin install` command
pub fn execute(id: &str, range: Option<&str>, ctx: &CommandContext) -> anyhow::Result<()> {
    let requested = parse_identifier(id, range)?;
    let mut manager = ctx.open_manager()?;

    let result = manager.install(&requested)?;
    manager.close()?;

    if result.is_noop() {
        ctx.output.success(&format!("{} is already installed", requested));
        return Ok(());
    }

    if !result.installed.is_empty() {
        ctx.output.heading("Installed");
        for record in &result.installed {
            ctx.output.item(&record.to_string());
        }
    }
    if !result.upgraded.is_empty() {
        ctx.output.heading("Upgraded");
        for upgrade in &result.upgraded {
            ctx.output.item(&format!("{} {} -> {}", upgrade.to.id, upgrade.from.version, upgrade.to.version));
        }
    }
    if !result.satisfied.is_empty() {
        ctx.output.heading("Already satisfied");
        for record in &result.satisfied {
            ctx.output.item(&record.to_string());
        }
    }

    ctx.output.success(&format!(
        "{} packages changed",
        result.installed.len() + result.upgraded.len()
    ));
    Ok(())
}

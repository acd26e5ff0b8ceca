//! `nupin list` command implementation.

use super::CommandContext;

/// Execute the `nupin list` command
pub fn execute(ctx: &CommandContext) -> anyhow::Result<()> {
    let manager = ctx.open_manager()?;
    let installed = manager.installed();

    if installed.is_empty() {
        ctx.output.info(&format!("No packages installed in {}", ctx.repository_path()));
        return Ok(());
    }

    for record in installed.iter() {
        let dependencies = match record.dependencies.len() {
            0 => String::new(),
            1 => " (1 dependency)".to_string(),
            count => format!(" ({} dependencies)", count),
        };
        ctx.output.item(&format!("{} {}{}", record.id, record.version, dependencies));
    }
    Ok(())
}

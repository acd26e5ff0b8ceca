//! `nupin restore` command implementation.

use super::CommandContext;

/// Execute the `nupin restore` command
pub fn execute(ctx: &CommandContext) -> anyhow::Result<()> {
    let mut manager = ctx.open_manager()?;
    let restored = manager.restore()?;
    manager.close()?;

    if restored.is_empty() {
        ctx.output.success("All installed packages are in place");
    } else {
        for record in &restored {
            ctx.output.success(&format!("Restored {}", record));
        }
    }
    Ok(())
}

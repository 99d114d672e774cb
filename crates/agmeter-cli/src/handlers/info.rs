use crate::context::ExecutionContext;
use crate::presentation::formatters::format_datetime;
use agmeter_types::Source;
use anyhow::Result;

pub fn handle(ctx: &ExecutionContext) -> Result<()> {
    let config = ctx.config()?;

    println!("=== Configuration ===");
    println!("  Agents:");
    println!("    Codex: {}", config.agents.codex);
    println!("    Claude: {}", config.agents.claude);

    println!("\n=== Last Sync ===");
    let db_path = ctx.database_path()?;
    if !db_path.exists() {
        println!("  No database found");
        return Ok(());
    }

    let db = ctx.db()?;
    for source in config.enabled_sources() {
        let label = match source {
            Source::Codex => "Codex",
            Source::Claude => "Claude",
        };
        let stamp = db.get_last_sync_time(source.as_str())?;
        if stamp > 0 {
            println!("  {}: {}", label, format_datetime(stamp));
        } else {
            println!("  {}: Never synced", label);
        }
    }

    Ok(())
}

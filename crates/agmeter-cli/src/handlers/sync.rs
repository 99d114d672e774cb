use crate::context::ExecutionContext;
use agmeter_providers::default_log_root;
use agmeter_runtime::SyncService;
use agmeter_types::Source;
use anyhow::Result;

pub fn handle(ctx: &ExecutionContext, agent: Option<Source>) -> Result<()> {
    let sources = match agent {
        Some(source) => vec![source],
        None => ctx.config()?.enabled_sources(),
    };

    for source in sources {
        sync_source(ctx, source)?;
    }
    Ok(())
}

/// Sync one source's log directory into the store, reporting what changed.
/// A source with no resolvable log directory is skipped quietly.
pub(crate) fn sync_source(ctx: &ExecutionContext, source: Source) -> Result<()> {
    let Some(log_root) = default_log_root(source) else {
        return Ok(());
    };

    let db = ctx.db()?;
    let report = SyncService::new(db).sync(source, &log_root)?;

    if report.inserted > 0 {
        println!("[Sync] Synced {} new sessions for {}", report.inserted, source);
    }
    if report.backfilled > 0 {
        println!(
            "[Sync] Updated {} existing sessions for {}",
            report.backfilled, source
        );
    }

    Ok(())
}

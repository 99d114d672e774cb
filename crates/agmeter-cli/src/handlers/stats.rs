use crate::context::ExecutionContext;
use crate::handlers::sync::sync_source;
use crate::presentation::views::{ViewOptions, render_all_stats};
use agmeter_runtime::StatsService;
use agmeter_types::Period;
use anyhow::Result;
use is_terminal::IsTerminal;

pub fn handle(ctx: &ExecutionContext, period: Period) -> Result<()> {
    let config = ctx.config()?;
    if config.autosync {
        for source in config.enabled_sources() {
            sync_source(ctx, source)?;
        }
    }

    let db = ctx.db()?;
    let service = StatsService::new(db);
    let report = service.usage_all(period)?;
    let per_source = service.per_source(period)?;

    let opts = ViewOptions {
        color: std::io::stdout().is_terminal(),
    };
    render_all_stats(period, &report, &per_source, &opts);

    Ok(())
}

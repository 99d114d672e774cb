use crate::context::ExecutionContext;
use crate::handlers::sync::sync_source;
use crate::presentation::views::{ViewOptions, render_usage};
use agmeter_runtime::StatsService;
use agmeter_types::{Period, Source};
use anyhow::Result;
use is_terminal::IsTerminal;

pub fn handle(ctx: &ExecutionContext, source: Source, period: Period) -> Result<()> {
    if ctx.config()?.autosync {
        sync_source(ctx, source)?;
    }

    let db = ctx.db()?;
    let report = StatsService::new(db).usage_for_source(source, period)?;

    let opts = ViewOptions {
        color: std::io::stdout().is_terminal(),
    };
    render_usage(source.as_str(), period, &report, &opts);

    Ok(())
}

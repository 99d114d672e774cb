use super::args::{Cli, Commands};
use super::context::ExecutionContext;
use super::handlers;
use anyhow::Result;

pub fn run(cli: Cli) -> Result<()> {
    let ctx = ExecutionContext::new(cli.config);

    match cli.command {
        Commands::Info => handlers::info::handle(&ctx),
        Commands::Sync { agent } => handlers::sync::handle(&ctx, agent.map(Into::into)),
        Commands::Usage { agent, period } => {
            handlers::usage::handle(&ctx, agent.into(), period.into())
        }
        Commands::Stats { period } => handlers::stats::handle(&ctx, period.into()),
    }
}

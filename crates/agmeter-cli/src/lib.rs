mod args;
mod commands;
pub mod context;
mod handlers;
pub mod presentation;

pub use args::{AgentArg, Cli, Commands, PeriodArg};
pub use commands::run;
pub use context::ExecutionContext;

use agmeter_types::{Period, Source};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "agmeter")]
#[command(about = "Track AI coding agent usage from local session logs", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to config file (default: ~/.agmeter/config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show loaded configuration and sync status
    Info,

    /// Scan session logs and store new sessions
    Sync {
        /// Sync only this agent (default: all enabled agents)
        agent: Option<AgentArg>,
    },

    /// Show usage statistics for one agent
    Usage {
        agent: AgentArg,

        /// Time window: day, week, or month
        #[arg(default_value = "day")]
        period: PeriodArg,
    },

    /// Show combined usage statistics for all agents
    Stats {
        /// Time window: day, week, or month
        #[arg(default_value = "day")]
        period: PeriodArg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AgentArg {
    Codex,
    Claude,
}

impl From<AgentArg> for Source {
    fn from(agent: AgentArg) -> Self {
        match agent {
            AgentArg::Codex => Source::Codex,
            AgentArg::Claude => Source::Claude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PeriodArg {
    Day,
    Week,
    Month,
}

impl From<PeriodArg> for Period {
    fn from(period: PeriodArg) -> Self {
        match period {
            PeriodArg::Day => Period::Day,
            PeriodArg::Week => Period::Week,
            PeriodArg::Month => Period::Month,
        }
    }
}

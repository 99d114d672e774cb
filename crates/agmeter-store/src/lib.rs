// SQLite persistence for tracked sessions.
//
// One database holds every synced session across all sources. Rows are
// written once and never mutated afterwards; re-syncing the same log file
// is a no-op (or a message backfill for rows persisted before transcript
// capture existed). Aggregate queries run over unix-second timestamps.

pub mod db;
pub mod error;
pub mod records;
pub mod stats;

pub use db::{Database, Outcome};
pub use error::{Error, Result};
pub use records::{
    AggregatedStats, DailySummary, MessageRow, ModelUsage, SessionRow, SourceStats, ToolCallRow,
    WeeklySummary,
};

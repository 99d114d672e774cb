pub mod config;
pub mod error;
pub mod services;

pub use config::Config;
pub use error::{Error, Result};
pub use services::stats::{StatsService, UsageReport};
pub use services::sync::{SyncReport, SyncService};

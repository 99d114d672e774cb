use agmeter_store::{
    AggregatedStats, DailySummary, Database, ModelUsage, SessionRow, SourceStats, WeeklySummary,
};
use agmeter_types::{Period, Source};
use chrono::Utc;

use crate::Result;

const TOP_MODEL_LIMIT: i64 = 3;
const RECENT_SESSION_LIMIT: i64 = 5;

/// Everything a usage view needs, assembled in one pass.
#[derive(Debug, Clone, Default)]
pub struct UsageReport {
    pub last_session: Option<SessionRow>,
    pub recent_sessions: Vec<SessionRow>,
    pub top_models: Vec<ModelUsage>,
    /// Populated for the week period only.
    pub daily_summaries: Vec<DailySummary>,
    /// Populated for the month period only.
    pub weekly_summaries: Vec<WeeklySummary>,
    pub totals: AggregatedStats,
    pub total_messages: i64,
    pub total_tool_calls: i64,
    pub unique_projects: i64,
    /// Unix timestamp of the last sync; 0 if never synced.
    pub last_sync_time: i64,
}

pub struct StatsService<'a> {
    db: &'a Database,
}

impl<'a> StatsService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Usage for one source over the period ending now.
    pub fn usage_for_source(&self, source: Source, period: Period) -> Result<UsageReport> {
        let since = period.since(Utc::now());
        let name = source.as_str();

        let mut report = UsageReport {
            last_session: self.db.last_session(name, since)?,
            top_models: self.db.top_models(Some(name), since, TOP_MODEL_LIMIT)?,
            totals: self.db.aggregated_stats(Some(name), since)?,
            total_messages: self.db.message_count(Some(name), since)?,
            total_tool_calls: self.db.tool_call_count(Some(name), since)?,
            unique_projects: self.db.unique_projects(Some(name), since)?,
            last_sync_time: self.db.get_last_sync_time(name)?,
            ..UsageReport::default()
        };

        match period {
            Period::Week => report.daily_summaries = self.db.daily_summaries(name, since)?,
            Period::Month => report.weekly_summaries = self.db.weekly_summaries(name, since)?,
            Period::Day => {}
        }

        Ok(report)
    }

    /// Combined usage across all sources over the period ending now.
    /// The sync stamp shown is the most recent across sources.
    pub fn usage_all(&self, period: Period) -> Result<UsageReport> {
        let since = period.since(Utc::now());

        let mut last_sync_time = 0;
        for source in Source::all() {
            let stamp = self.db.get_last_sync_time(source.as_str())?;
            if stamp > last_sync_time {
                last_sync_time = stamp;
            }
        }

        Ok(UsageReport {
            recent_sessions: self.db.recent_sessions(RECENT_SESSION_LIMIT)?,
            top_models: self.db.top_models(None, since, TOP_MODEL_LIMIT)?,
            totals: self.db.aggregated_stats(None, since)?,
            total_messages: self.db.message_count(None, since)?,
            total_tool_calls: self.db.tool_call_count(None, since)?,
            unique_projects: self.db.unique_projects(None, since)?,
            last_sync_time,
            ..UsageReport::default()
        })
    }

    /// Per-source breakdown over the period ending now.
    pub fn per_source(&self, period: Period) -> Result<Vec<SourceStats>> {
        let since = period.since(Utc::now());
        Ok(self.db.per_source_stats(since)?)
    }
}

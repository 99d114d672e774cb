//! Aggregate queries over the session window.
//!
//! Every query takes `since`, a unix-second lower bound on `started_at`.
//! Durations only count sessions whose end is strictly after their start;
//! rows with missing or inverted timestamps contribute zero seconds.

use rusqlite::params;

use crate::db::{Database, scan_session};
use crate::error::Result;
use crate::records::{
    AggregatedStats, DailySummary, ModelUsage, SessionRow, SourceStats, WeeklySummary,
};

const MESSAGE_COUNT_SUBQUERY: &str =
    "COALESCE((SELECT COUNT(*) FROM messages m WHERE m.session_id = s.id), 0)";

const SESSION_TIME_SUM: &str = "COALESCE(SUM(CASE WHEN ended_at IS NOT NULL AND ended_at > started_at THEN ended_at - started_at ELSE 0 END), 0)";

impl Database {
    /// Most recent session for a source within the window, if any.
    pub fn last_session(&self, source: &str, since: i64) -> Result<Option<SessionRow>> {
        let query = format!(
            r#"
            SELECT s.id, s.external_id, s.source, s.project_path, s.model, s.provider, s.started_at, s.ended_at,
                s.input_tokens, s.output_tokens, s.cache_creation_tokens, s.cache_read_tokens, s.reasoning_tokens, s.total_tokens, s.cost,
                {MESSAGE_COUNT_SUBQUERY} as message_count
            FROM sessions s WHERE s.source = ?1 AND s.started_at >= ?2
            ORDER BY s.started_at DESC LIMIT 1
            "#
        );

        let mut stmt = self.conn().prepare(&query)?;
        let mut rows = stmt.query_map(params![source, since], |row| {
            let mut s = scan_session(row)?;
            s.message_count = row.get(15)?;
            Ok(s)
        })?;

        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Most recent sessions across all sources, newest first.
    pub fn recent_sessions(&self, limit: i64) -> Result<Vec<SessionRow>> {
        let query = format!(
            r#"
            SELECT s.id, s.external_id, s.source, s.project_path, s.model, s.provider, s.started_at, s.ended_at,
                s.input_tokens, s.output_tokens, s.cache_creation_tokens, s.cache_read_tokens, s.reasoning_tokens, s.total_tokens, s.cost,
                {MESSAGE_COUNT_SUBQUERY} as message_count
            FROM sessions s ORDER BY s.started_at DESC LIMIT ?1
            "#
        );

        let mut stmt = self.conn().prepare(&query)?;
        let sessions = stmt
            .query_map([limit], |row| {
                let mut s = scan_session(row)?;
                s.message_count = row.get(15)?;
                Ok(s)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(sessions)
    }

    /// Top models by session count. Sessions with an empty or NULL model
    /// are excluded rather than ranked under a blank label.
    pub fn top_models(&self, source: Option<&str>, since: i64, limit: i64) -> Result<Vec<ModelUsage>> {
        let (query, bind_source) = match source {
            Some(_) => (
                "SELECT model, COUNT(*) as session_count
                 FROM sessions WHERE source = ?1 AND started_at >= ?2 AND model IS NOT NULL AND model != ''
                 GROUP BY model ORDER BY session_count DESC LIMIT ?3",
                true,
            ),
            None => (
                "SELECT model, COUNT(*) as session_count
                 FROM sessions WHERE started_at >= ?1 AND model IS NOT NULL AND model != ''
                 GROUP BY model ORDER BY session_count DESC LIMIT ?2",
                false,
            ),
        };

        let mut stmt = self.conn().prepare(query)?;
        let scan = |row: &rusqlite::Row<'_>| {
            Ok(ModelUsage {
                model: row.get(0)?,
                session_count: row.get(1)?,
            })
        };
        let models = if bind_source {
            stmt.query_map(params![source, since, limit], scan)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        } else {
            stmt.query_map(params![since, limit], scan)?
                .collect::<std::result::Result<Vec<_>, _>>()?
        };

        Ok(models)
    }

    /// One-row aggregate over the window, optionally restricted to a source.
    pub fn aggregated_stats(&self, source: Option<&str>, since: i64) -> Result<AggregatedStats> {
        let select = format!(
            r#"
            SELECT
                {SESSION_TIME_SUM} as total_time,
                COALESCE(SUM(input_tokens), 0) as total_input,
                COALESCE(SUM(output_tokens), 0) as total_output,
                COALESCE(SUM(cache_creation_tokens), 0) as total_cache_creation,
                COALESCE(SUM(cache_read_tokens), 0) as total_cache_read,
                COALESCE(SUM(total_tokens), 0) as total_tokens,
                COALESCE(SUM(cost), 0) as total_cost,
                COUNT(*) as session_count
            FROM sessions
            "#
        );

        let scan = |row: &rusqlite::Row<'_>| {
            Ok(AggregatedStats {
                total_session_time: row.get(0)?,
                total_input_tokens: row.get(1)?,
                total_output_tokens: row.get(2)?,
                total_cache_creation: row.get(3)?,
                total_cache_read: row.get(4)?,
                total_tokens: row.get(5)?,
                total_cost: row.get(6)?,
                session_count: row.get(7)?,
            })
        };

        let stats = match source {
            Some(source) => self.conn().query_row(
                &format!("{select} WHERE source = ?1 AND started_at >= ?2"),
                params![source, since],
                scan,
            )?,
            None => self.conn().query_row(
                &format!("{select} WHERE started_at >= ?1"),
                params![since],
                scan,
            )?,
        };

        Ok(stats)
    }

    /// Message count over sessions in the window, via the session join.
    pub fn message_count(&self, source: Option<&str>, since: i64) -> Result<i64> {
        let count = match source {
            Some(source) => self.conn().query_row(
                "SELECT COALESCE(COUNT(m.id), 0)
                 FROM messages m JOIN sessions s ON m.session_id = s.id
                 WHERE s.source = ?1 AND s.started_at >= ?2",
                params![source, since],
                |row| row.get(0),
            )?,
            None => self.conn().query_row(
                "SELECT COALESCE(COUNT(m.id), 0)
                 FROM messages m JOIN sessions s ON m.session_id = s.id
                 WHERE s.started_at >= ?1",
                params![since],
                |row| row.get(0),
            )?,
        };
        Ok(count)
    }

    /// Tool call count over sessions in the window, via the session join.
    pub fn tool_call_count(&self, source: Option<&str>, since: i64) -> Result<i64> {
        let count = match source {
            Some(source) => self.conn().query_row(
                "SELECT COALESCE(COUNT(t.id), 0)
                 FROM tool_calls t JOIN sessions s ON t.session_id = s.id
                 WHERE s.source = ?1 AND s.started_at >= ?2",
                params![source, since],
                |row| row.get(0),
            )?,
            None => self.conn().query_row(
                "SELECT COALESCE(COUNT(t.id), 0)
                 FROM tool_calls t JOIN sessions s ON t.session_id = s.id
                 WHERE s.started_at >= ?1",
                params![since],
                |row| row.get(0),
            )?,
        };
        Ok(count)
    }

    /// Count of distinct project paths in the window.
    pub fn unique_projects(&self, source: Option<&str>, since: i64) -> Result<i64> {
        let count = match source {
            Some(source) => self.conn().query_row(
                "SELECT COALESCE(COUNT(DISTINCT project_path), 0)
                 FROM sessions WHERE source = ?1 AND started_at >= ?2 AND project_path IS NOT NULL",
                params![source, since],
                |row| row.get(0),
            )?,
            None => self.conn().query_row(
                "SELECT COALESCE(COUNT(DISTINCT project_path), 0)
                 FROM sessions WHERE started_at >= ?1 AND project_path IS NOT NULL",
                params![since],
                |row| row.get(0),
            )?,
        };
        Ok(count)
    }

    /// Per-calendar-day rollups, newest day first.
    pub fn daily_summaries(&self, source: &str, since: i64) -> Result<Vec<DailySummary>> {
        let query = format!(
            r#"
            SELECT date(started_at, 'unixepoch') as day,
                COUNT(*) as sessions,
                {SESSION_TIME_SUM} as total_time,
                COALESCE(SUM(total_tokens), 0) as total_tokens
            FROM sessions
            WHERE source = ?1 AND started_at >= ?2
            GROUP BY day
            ORDER BY day DESC
            "#
        );

        let mut stmt = self.conn().prepare(&query)?;
        let summaries = stmt
            .query_map(params![source, since], |row| {
                Ok(DailySummary {
                    date: row.get(0)?,
                    session_count: row.get(1)?,
                    total_time: row.get(2)?,
                    total_tokens: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(summaries)
    }

    /// Per-ISO-week rollups, newest week first. The label is the date of
    /// the earliest session in that week.
    pub fn weekly_summaries(&self, source: &str, since: i64) -> Result<Vec<WeeklySummary>> {
        let query = format!(
            r#"
            SELECT strftime('%Y/%m/%d', datetime(min(started_at), 'unixepoch')) as week_start,
                COUNT(*) as sessions,
                {SESSION_TIME_SUM} as total_time,
                COALESCE(SUM(total_tokens), 0) as total_tokens
            FROM sessions
            WHERE source = ?1 AND started_at >= ?2
            GROUP BY strftime('%Y-W%W', started_at, 'unixepoch')
            ORDER BY week_start DESC
            "#
        );

        let mut stmt = self.conn().prepare(&query)?;
        let summaries = stmt
            .query_map(params![source, since], |row| {
                Ok(WeeklySummary {
                    week_start: row.get(0)?,
                    session_count: row.get(1)?,
                    total_time: row.get(2)?,
                    total_tokens: row.get(3)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(summaries)
    }

    /// Breakdown by source over the window, busiest source first.
    pub fn per_source_stats(&self, since: i64) -> Result<Vec<SourceStats>> {
        let query = r#"
            SELECT s.source,
                COUNT(*) as session_count,
                COALESCE(SUM(s.input_tokens), 0) as total_input,
                COALESCE(SUM(s.output_tokens), 0) as total_output,
                COALESCE(SUM(s.cache_creation_tokens), 0) as total_cache_creation,
                COALESCE(SUM(s.cache_read_tokens), 0) as total_cache_read,
                COALESCE(SUM(s.total_tokens), 0) as total_tokens,
                COALESCE(SUM(s.cost), 0) as total_cost,
                COALESCE(SUM(CASE WHEN s.ended_at IS NOT NULL AND s.ended_at > s.started_at THEN s.ended_at - s.started_at ELSE 0 END), 0) as total_time,
                COALESCE(SUM(m.message_count), 0) as total_messages
            FROM sessions s
            LEFT JOIN (
                SELECT session_id, COUNT(*) as message_count FROM messages GROUP BY session_id
            ) m ON m.session_id = s.id
            WHERE s.started_at >= ?1
            GROUP BY s.source ORDER BY session_count DESC
            "#;

        let mut stmt = self.conn().prepare(query)?;
        let stats = stmt
            .query_map([since], |row| {
                Ok(SourceStats {
                    source: row.get(0)?,
                    session_count: row.get(1)?,
                    total_input_tokens: row.get(2)?,
                    total_output_tokens: row.get(3)?,
                    total_cache_creation: row.get(4)?,
                    total_cache_read: row.get(5)?,
                    total_tokens: row.get(6)?,
                    total_cost: row.get(7)?,
                    total_time: row.get(8)?,
                    total_messages: row.get(9)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agmeter_types::{ParsedMessage, ParsedSession, ParsedToolCall, Source, TokenUsage};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn session(
        external_id: &str,
        source: Source,
        model: &str,
        project: &str,
        started: DateTime<Utc>,
        duration_secs: i64,
        total_tokens: u64,
    ) -> ParsedSession {
        ParsedSession {
            external_id: external_id.to_string(),
            source,
            project_path: project.to_string(),
            model: model.to_string(),
            provider: String::new(),
            started_at: Some(started),
            ended_at: Some(started + Duration::seconds(duration_secs)),
            tokens: TokenUsage {
                input: total_tokens / 2,
                output: total_tokens / 2,
                total: total_tokens,
                ..TokenUsage::default()
            },
            cost: 0.01,
            messages: vec![ParsedMessage {
                role: "user".to_string(),
                content: "hi".to_string(),
                timestamp: Some(started),
            }],
            tool_calls: vec![ParsedToolCall {
                tool_name: "shell".to_string(),
                arguments: "{}".to_string(),
                result: String::new(),
                timestamp: Some(started),
            }],
        }
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_last_session_picks_newest_in_window() {
        let db = Database::open_in_memory().unwrap();
        db.reconcile(&session("a", Source::Codex, "m1", "/p", at(1, 9), 60, 100))
            .unwrap();
        db.reconcile(&session("b", Source::Codex, "m2", "/p", at(2, 9), 60, 100))
            .unwrap();

        let last = db.last_session("codex", 0).unwrap().unwrap();
        assert_eq!(last.external_id, "b");
        assert_eq!(last.message_count, 1);

        // Window excludes everything.
        let since = at(3, 0).timestamp();
        assert!(db.last_session("codex", since).unwrap().is_none());
    }

    #[test]
    fn test_top_models_excludes_unnamed_sessions() {
        let db = Database::open_in_memory().unwrap();
        db.reconcile(&session("a", Source::Codex, "gpt-5", "/p", at(1, 9), 60, 100))
            .unwrap();
        db.reconcile(&session("b", Source::Codex, "gpt-5", "/p", at(1, 10), 60, 100))
            .unwrap();
        db.reconcile(&session("c", Source::Codex, "", "/p", at(1, 11), 60, 100))
            .unwrap();
        db.reconcile(&session("d", Source::Codex, "o3", "/p", at(1, 12), 60, 100))
            .unwrap();

        let models = db.top_models(Some("codex"), 0, 3).unwrap();
        assert_eq!(
            models,
            vec![
                ModelUsage {
                    model: "gpt-5".to_string(),
                    session_count: 2
                },
                ModelUsage {
                    model: "o3".to_string(),
                    session_count: 1
                },
            ]
        );
    }

    #[test]
    fn test_aggregated_stats_sums_window_only() {
        let db = Database::open_in_memory().unwrap();
        db.reconcile(&session("a", Source::Codex, "m", "/p1", at(1, 9), 600, 100))
            .unwrap();
        db.reconcile(&session("b", Source::Codex, "m", "/p2", at(5, 9), 300, 200))
            .unwrap();
        db.reconcile(&session("c", Source::Claude, "m", "/p1", at(5, 10), 60, 50))
            .unwrap();

        let since = at(4, 0).timestamp();
        let codex = db.aggregated_stats(Some("codex"), since).unwrap();
        assert_eq!(codex.session_count, 1);
        assert_eq!(codex.total_session_time, 300);
        assert_eq!(codex.total_tokens, 200);

        let all = db.aggregated_stats(None, since).unwrap();
        assert_eq!(all.session_count, 2);
        assert_eq!(all.total_session_time, 360);
        assert_eq!(all.total_tokens, 250);
        assert_eq!(all.total_cost, 0.02);
    }

    #[test]
    fn test_inverted_duration_counts_as_zero() {
        let db = Database::open_in_memory().unwrap();
        let mut s = session("a", Source::Codex, "m", "/p", at(1, 9), 600, 100);
        s.ended_at = Some(at(1, 8)); // before start
        db.reconcile(&s).unwrap();

        let stats = db.aggregated_stats(Some("codex"), 0).unwrap();
        assert_eq!(stats.total_session_time, 0);
        assert_eq!(stats.session_count, 1);
    }

    #[test]
    fn test_message_and_tool_call_counts_follow_session_window() {
        let db = Database::open_in_memory().unwrap();
        db.reconcile(&session("a", Source::Codex, "m", "/p", at(1, 9), 60, 100))
            .unwrap();
        db.reconcile(&session("b", Source::Codex, "m", "/p", at(5, 9), 60, 100))
            .unwrap();

        assert_eq!(db.message_count(Some("codex"), 0).unwrap(), 2);
        assert_eq!(db.tool_call_count(Some("codex"), 0).unwrap(), 2);

        let since = at(4, 0).timestamp();
        assert_eq!(db.message_count(Some("codex"), since).unwrap(), 1);
        assert_eq!(db.tool_call_count(None, since).unwrap(), 1);
    }

    #[test]
    fn test_unique_projects_counts_distinct_paths() {
        let db = Database::open_in_memory().unwrap();
        db.reconcile(&session("a", Source::Codex, "m", "/p1", at(1, 9), 60, 100))
            .unwrap();
        db.reconcile(&session("b", Source::Codex, "m", "/p1", at(1, 10), 60, 100))
            .unwrap();
        db.reconcile(&session("c", Source::Codex, "m", "/p2", at(1, 11), 60, 100))
            .unwrap();

        assert_eq!(db.unique_projects(Some("codex"), 0).unwrap(), 2);
        assert_eq!(db.unique_projects(None, 0).unwrap(), 2);
    }

    #[test]
    fn test_daily_summaries_group_by_day_newest_first() {
        let db = Database::open_in_memory().unwrap();
        db.reconcile(&session("a", Source::Codex, "m", "/p", at(1, 9), 60, 100))
            .unwrap();
        db.reconcile(&session("b", Source::Codex, "m", "/p", at(1, 15), 120, 200))
            .unwrap();
        db.reconcile(&session("c", Source::Codex, "m", "/p", at(3, 9), 30, 50))
            .unwrap();

        let summaries = db.daily_summaries("codex", 0).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].date, "2025-03-03");
        assert_eq!(summaries[0].session_count, 1);
        assert_eq!(summaries[0].total_tokens, 50);
        assert_eq!(summaries[1].date, "2025-03-01");
        assert_eq!(summaries[1].session_count, 2);
        assert_eq!(summaries[1].total_time, 180);
        assert_eq!(summaries[1].total_tokens, 300);
    }

    #[test]
    fn test_weekly_summaries_group_by_week() {
        let db = Database::open_in_memory().unwrap();
        // 2025-03-03 is a Monday; 2025-03-10 starts the next week.
        db.reconcile(&session("a", Source::Codex, "m", "/p", at(3, 9), 60, 100))
            .unwrap();
        db.reconcile(&session("b", Source::Codex, "m", "/p", at(5, 9), 60, 200))
            .unwrap();
        db.reconcile(&session("c", Source::Codex, "m", "/p", at(10, 9), 60, 400))
            .unwrap();

        let summaries = db.weekly_summaries("codex", 0).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].week_start, "2025/03/10");
        assert_eq!(summaries[0].total_tokens, 400);
        assert_eq!(summaries[1].week_start, "2025/03/03");
        assert_eq!(summaries[1].session_count, 2);
        assert_eq!(summaries[1].total_tokens, 300);
    }

    #[test]
    fn test_recent_sessions_span_sources() {
        let db = Database::open_in_memory().unwrap();
        for i in 0..7 {
            let source = if i % 2 == 0 { Source::Codex } else { Source::Claude };
            db.reconcile(&session(
                &format!("s-{i}"),
                source,
                "m",
                "/p",
                at(1, 9) + Duration::hours(i),
                60,
                100,
            ))
            .unwrap();
        }

        let recent = db.recent_sessions(5).unwrap();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].external_id, "s-6");
        assert_eq!(recent[4].external_id, "s-2");
    }

    #[test]
    fn test_per_source_stats_breaks_down_by_source() {
        let db = Database::open_in_memory().unwrap();
        db.reconcile(&session("a", Source::Codex, "m", "/p", at(1, 9), 60, 100))
            .unwrap();
        db.reconcile(&session("b", Source::Codex, "m", "/p", at(1, 10), 60, 100))
            .unwrap();
        db.reconcile(&session("c", Source::Claude, "m", "/p", at(1, 11), 120, 300))
            .unwrap();

        let stats = db.per_source_stats(0).unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].source, "codex");
        assert_eq!(stats[0].session_count, 2);
        assert_eq!(stats[0].total_messages, 2);
        assert_eq!(stats[1].source, "claude");
        assert_eq!(stats[1].total_time, 120);
        assert_eq!(stats[1].total_tokens, 300);
    }

    #[test]
    fn test_empty_database_aggregates_to_zero() {
        let db = Database::open_in_memory().unwrap();

        let stats = db.aggregated_stats(None, 0).unwrap();
        assert_eq!(stats.session_count, 0);
        assert_eq!(stats.total_tokens, 0);
        assert_eq!(stats.total_cost, 0.0);
        assert!(db.top_models(None, 0, 3).unwrap().is_empty());
        assert!(db.recent_sessions(5).unwrap().is_empty());
        assert!(db.per_source_stats(0).unwrap().is_empty());
    }
}

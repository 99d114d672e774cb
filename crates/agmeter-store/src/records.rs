//! Row types and aggregate shapes returned by the store.

/// A persisted session. `id` is the internal rowid; `external_id` is the
/// identifier the agent itself assigned to the session.
#[derive(Debug, Clone, Default)]
pub struct SessionRow {
    pub id: i64,
    pub external_id: String,
    pub source: String,
    pub project_path: String,
    pub model: String,
    pub provider: String,
    pub started_at: i64,
    pub ended_at: Option<i64>,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub cache_creation_tokens: i64,
    pub cache_read_tokens: i64,
    pub reasoning_tokens: i64,
    pub total_tokens: i64,
    pub cost: f64,
    pub message_count: i64,
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: i64,
    pub session_id: i64,
    pub role: String,
    pub content: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone)]
pub struct ToolCallRow {
    pub id: i64,
    pub session_id: i64,
    pub tool_name: String,
    pub arguments: String,
    pub result: String,
    pub timestamp: i64,
}

/// Session count per model name, for the "top models" ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelUsage {
    pub model: String,
    pub session_count: i64,
}

/// One-row aggregate over a time window.
#[derive(Debug, Clone, Default)]
pub struct AggregatedStats {
    /// Sum of positive session durations, in seconds.
    pub total_session_time: i64,
    pub total_input_tokens: i64,
    pub total_output_tokens: i64,
    pub total_cache_creation: i64,
    pub total_cache_read: i64,
    pub total_tokens: i64,
    pub total_cost: f64,
    pub session_count: i64,
}

/// Per-calendar-day rollup, used for the week view.
#[derive(Debug, Clone)]
pub struct DailySummary {
    pub date: String,
    pub session_count: i64,
    pub total_time: i64,
    pub total_tokens: i64,
}

/// Per-ISO-week rollup, used for the month view.
#[derive(Debug, Clone)]
pub struct WeeklySummary {
    pub week_start: String,
    pub session_count: i64,
    pub total_time: i64,
    pub total_tokens: i64,
}

/// Per-source breakdown over a time window.
#[derive(Debug, Clone)]
pub struct SourceStats {
    pub source: String,
    pub session_count: i64,
    pub total_input_tokens: i64,
    pub total_output_tokens: i64,
    pub total_cache_creation: i64,
    pub total_cache_read: i64,
    pub total_tokens: i64,
    pub total_cost: f64,
    pub total_time: i64,
    pub total_messages: i64,
}

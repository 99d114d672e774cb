use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Originating agent product. Each source has its own log schema and its
/// own parser in `agmeter-providers`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Codex,
    Claude,
}

impl Source {
    /// Stable string form, used in the `sessions.source` column and in
    /// metadata keys (`last_sync_<source>`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Codex => "codex",
            Source::Claude => "claude",
        }
    }

    pub fn all() -> [Source; 2] {
        [Source::Codex, Source::Claude]
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "codex" => Ok(Source::Codex),
            "claude" => Ok(Source::Claude),
            other => Err(format!("unknown source: {}", other)),
        }
    }
}

/// Token counters for one session.
///
/// `total` semantics differ by source: Codex reports an authoritative
/// running total in its `token_count` events, while Claude totals are the
/// sum of all four accumulated components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
    pub cache_creation: u64,
    pub cache_read: u64,
    pub reasoning: u64,
    pub total: u64,
}

/// One transcript entry, in event order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedMessage {
    pub role: String,
    pub content: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// One captured tool invocation (Codex only in practice).
///
/// `result` is structurally present but never populated: the Codex log
/// format emits `tool_use` events without a correlated result event, and
/// we deliberately do not invent correlation logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedToolCall {
    pub tool_name: String,
    pub arguments: String,
    pub result: String,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Canonical session record produced by one file parse.
///
/// Parsing is stateless: re-parsing the same file yields the same value.
/// A session assembled from zero events has `None` timestamps, zero token
/// counts, and empty collections; that is an empty result, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedSession {
    /// Agent-assigned session identifier. Empty string marks a degenerate,
    /// unidentified session.
    pub external_id: String,
    pub source: Source,
    pub project_path: String,
    pub model: String,
    pub provider: String,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub tokens: TokenUsage,
    /// Best-effort USD estimate from the static price table.
    pub cost: f64,
    pub messages: Vec<ParsedMessage>,
    pub tool_calls: Vec<ParsedToolCall>,
}

impl ParsedSession {
    pub fn empty(source: Source) -> Self {
        Self {
            external_id: String::new(),
            source,
            project_path: String::new(),
            model: String::new(),
            provider: String::new(),
            started_at: None,
            ended_at: None,
            tokens: TokenUsage::default(),
            cost: 0.0,
            messages: Vec::new(),
            tool_calls: Vec::new(),
        }
    }
}

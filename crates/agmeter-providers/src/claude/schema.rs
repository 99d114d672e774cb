use serde::Deserialize;
use serde_json::Value;

/// One line of a Claude Code project log. Every field is optional in
/// practice; serde defaults keep partially-shaped records decodable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClaudeRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: String,
    /// `sessionId` in current logs, `session_id` in older ones.
    #[serde(rename = "sessionId", alias = "session_id")]
    pub session_id: String,
    /// `cwd` in current logs, `project_path` in older ones.
    #[serde(alias = "project_path")]
    pub cwd: String,
    pub model: String,
    pub input: String,
    pub role: String,
    pub content: Option<Value>,
    pub message: Option<ClaudeMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClaudeMessage {
    pub model: String,
    pub role: String,
    pub usage: Option<ClaudeUsage>,
    pub content: Option<Value>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct ClaudeUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_creation_input_tokens: u64,
    pub cache_read_input_tokens: u64,
}

use serde::Deserialize;
use serde_json::Value;

/// One line of a Codex rollout file. The payload shape depends on `type`,
/// so it is held as a raw value and decoded per-type; that keeps a line
/// with an unexpected payload from poisoning the whole record.
#[derive(Debug, Deserialize)]
pub(crate) struct CodexEnvelope {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SessionMetaPayload {
    pub id: String,
    pub cwd: String,
    pub originator: String,
    pub model_provider: String,
    /// The session's own start timestamp, distinct from the record's.
    pub timestamp: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct TurnContextPayload {
    pub model: String,
}

/// `response_item` payload; only `type == "message"` entries are kept.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ResponseItemPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub role: String,
    pub content: Vec<MessageContent>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub(crate) enum MessageContent {
    InputText {
        #[serde(default)]
        text: String,
    },
    OutputText {
        #[serde(default)]
        text: String,
    },
    #[serde(other)]
    Unknown,
}

/// `event_msg` payload, keyed by its own nested `type` field.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub(crate) enum EventMsgPayload {
    ToolUse {
        #[serde(default)]
        name: String,
        #[serde(default)]
        input: Value,
    },
    TokenCount {
        #[serde(default)]
        info: Option<TokenInfo>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct TokenInfo {
    pub total_token_usage: TokenCounts,
}

/// Authoritative running totals; later events supersede earlier ones.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct TokenCounts {
    pub input_tokens: u64,
    pub cached_input_tokens: u64,
    pub output_tokens: u64,
    pub reasoning_output_tokens: u64,
    pub total_tokens: u64,
}

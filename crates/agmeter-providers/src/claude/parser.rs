use crate::timestamp::parse_timestamp;
use crate::{Error, Result};
use agmeter_types::{ParsedMessage, ParsedSession, Source, estimate_cost};
use serde_json::Value;
use std::path::Path;

use super::schema::ClaudeRecord;

/// Claude Code project-log parser: folds one JSONL file into a
/// [`ParsedSession`].
pub struct ClaudeParser;

impl crate::traits::SessionSource for ClaudeParser {
    fn source(&self) -> Source {
        Source::Claude
    }

    fn parse_file(&self, path: &Path) -> Result<ParsedSession> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(assemble(&text))
    }
}

fn assemble(text: &str) -> ParsedSession {
    let mut session = ParsedSession::empty(Source::Claude);
    session.provider = "anthropic".to_string();
    let mut first_ts = None;
    let mut last_ts = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Ok(record) = serde_json::from_str::<ClaudeRecord>(line) else {
            continue;
        };

        let ts = parse_timestamp(&record.timestamp);
        if first_ts.is_none() {
            first_ts = ts;
        }
        if ts.is_some() {
            last_ts = ts;
        }

        // Identity fields are captured on first occurrence only.
        if session.external_id.is_empty() && !record.session_id.is_empty() {
            session.external_id = record.session_id.clone();
        }
        if session.project_path.is_empty() && !record.cwd.is_empty() {
            session.project_path = record.cwd.clone();
        }
        if session.model.is_empty() && !record.model.is_empty() {
            session.model = record.model.clone();
        }

        let content;
        let mut role = String::new();
        if let Some(message) = &record.message {
            content = extract_content(message.content.as_ref());
            if !message.role.is_empty() {
                role = message.role.clone();
            }
            // Per-message model is authoritative, unlike the outer field.
            if !message.model.is_empty() {
                session.model = message.model.clone();
            }
            if let Some(usage) = &message.usage {
                session.tokens.input += usage.input_tokens;
                session.tokens.output += usage.output_tokens;
                session.tokens.cache_creation += usage.cache_creation_input_tokens;
                session.tokens.cache_read += usage.cache_read_input_tokens;
            }
        } else {
            content = extract_content(record.content.as_ref());
            if !record.role.is_empty() {
                role = record.role.clone();
            }
        }

        match record.kind.as_str() {
            "user" => {
                if !record.input.is_empty() {
                    session.messages.push(ParsedMessage {
                        role: "user".to_string(),
                        content: record.input,
                        timestamp: ts,
                    });
                } else if !content.is_empty() {
                    session.messages.push(ParsedMessage {
                        role: if role.is_empty() { "user".to_string() } else { role },
                        content,
                        timestamp: ts,
                    });
                }
            }

            "assistant" => {
                if !content.is_empty() {
                    session.messages.push(ParsedMessage {
                        role: if role.is_empty() {
                            "assistant".to_string()
                        } else {
                            role
                        },
                        content,
                        timestamp: ts,
                    });
                }
            }

            // System entries carry metadata we do not extract yet.
            "system" => {}

            _ => {
                if !content.is_empty() && !role.is_empty() {
                    session.messages.push(ParsedMessage {
                        role,
                        content,
                        timestamp: ts,
                    });
                }
            }
        }
    }

    session.started_at = first_ts;
    session.ended_at = last_ts;
    session.tokens.total = session.tokens.input
        + session.tokens.output
        + session.tokens.cache_creation
        + session.tokens.cache_read;
    session.cost = estimate_cost(Source::Claude, &session.tokens);

    session
}

/// Flattens the three content encodings to a transcript string: a plain
/// string, an array of typed blocks joined by newlines, or an object with
/// a `text`/`content` field. Anything else yields an empty string.
fn extract_content(content: Option<&Value>) -> String {
    let Some(value) = content else {
        return String::new();
    };

    match value {
        Value::String(s) => s.clone(),

        Value::Array(blocks) => {
            let mut parts = Vec::with_capacity(blocks.len());
            for block in blocks {
                let kind = block.get("type").and_then(Value::as_str).unwrap_or("");
                match kind {
                    "text" => {
                        if let Some(text) = block.get("text").and_then(Value::as_str)
                            && !text.is_empty()
                        {
                            parts.push(text.to_string());
                        }
                    }
                    "thinking" => {
                        if let Some(thinking) = block.get("thinking").and_then(Value::as_str)
                            && !thinking.is_empty()
                        {
                            parts.push(thinking.to_string());
                        }
                    }
                    "tool_use" => {
                        match block.get("name").and_then(Value::as_str) {
                            Some(name) if !name.is_empty() => {
                                parts.push(format!("[tool_use:{name}]"));
                            }
                            _ => parts.push("[tool_use]".to_string()),
                        }
                    }
                    "tool_result" => {
                        match block.get("content").and_then(Value::as_str) {
                            Some(content) if !content.is_empty() => {
                                parts.push(content.to_string());
                            }
                            _ => parts.push("[tool_result]".to_string()),
                        }
                    }
                    _ => {
                        if let Some(text) = block.get("text").and_then(Value::as_str)
                            && !text.is_empty()
                        {
                            parts.push(text.to_string());
                        }
                        if let Some(content) = block.get("content").and_then(Value::as_str)
                            && !content.is_empty()
                        {
                            parts.push(content.to_string());
                        }
                    }
                }
            }
            parts.join("\n")
        }

        Value::Object(obj) => {
            if let Some(text) = obj.get("text").and_then(Value::as_str) {
                text.to_string()
            } else if let Some(content) = obj.get("content").and_then(Value::as_str) {
                content.to_string()
            } else {
                String::new()
            }
        }

        _ => String::new(),
    }
}

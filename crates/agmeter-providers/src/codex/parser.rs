use crate::timestamp::parse_timestamp;
use crate::{Error, Result};
use agmeter_types::{
    ParsedMessage, ParsedSession, ParsedToolCall, Source, estimate_cost,
    estimate_tokens_from_chars,
};
use std::path::Path;

use super::schema::{
    CodexEnvelope, EventMsgPayload, MessageContent, ResponseItemPayload, SessionMetaPayload,
    TurnContextPayload,
};

/// Codex rollout parser: folds one JSONL file into a [`ParsedSession`].
pub struct CodexParser;

impl crate::traits::SessionSource for CodexParser {
    fn source(&self) -> Source {
        Source::Codex
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
    let mut session = ParsedSession::empty(Source::Codex);
    let mut first_ts = None;
    let mut last_ts = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Ok(envelope) = serde_json::from_str::<CodexEnvelope>(line) else {
            continue;
        };

        let ts = parse_timestamp(&envelope.timestamp);
        if first_ts.is_none() {
            first_ts = ts;
        }
        last_ts = ts;

        match envelope.kind.as_str() {
            "session_meta" => {
                if let Ok(meta) = serde_json::from_value::<SessionMetaPayload>(envelope.payload) {
                    if session.external_id.is_empty() {
                        session.external_id = meta.id;
                    }
                    if !meta.cwd.is_empty() {
                        session.project_path = meta.cwd;
                    }
                    if !meta.model_provider.is_empty() {
                        session.provider = meta.model_provider;
                    }
                    if !meta.originator.is_empty() {
                        session.model = meta.originator;
                    }
                    // Tentative start; superseded by the first record
                    // timestamp at finalization.
                    session.started_at = parse_timestamp(&meta.timestamp);
                }
            }

            "turn_context" => {
                // Authoritative model name, overrides session_meta.originator.
                if let Ok(turn) = serde_json::from_value::<TurnContextPayload>(envelope.payload)
                    && !turn.model.is_empty()
                {
                    session.model = turn.model;
                }
            }

            "response_item" => {
                if let Ok(item) = serde_json::from_value::<ResponseItemPayload>(envelope.payload)
                    && item.kind == "message"
                {
                    let content = extract_message_text(&item.content);
                    if !content.is_empty() {
                        session.messages.push(ParsedMessage {
                            role: item.role,
                            content,
                            timestamp: ts,
                        });
                    }
                }
            }

            "event_msg" => match serde_json::from_value::<EventMsgPayload>(envelope.payload) {
                Ok(EventMsgPayload::ToolUse { name, input }) => {
                    // No correlation with a later result event; the result
                    // stays empty on purpose.
                    session.tool_calls.push(ParsedToolCall {
                        tool_name: name,
                        arguments: input.to_string(),
                        result: String::new(),
                        timestamp: ts,
                    });
                }
                Ok(EventMsgPayload::TokenCount { info: Some(info) }) => {
                    // Running totals: overwrite, never accumulate.
                    let usage = info.total_token_usage;
                    session.tokens.input = usage.input_tokens;
                    session.tokens.cache_read = usage.cached_input_tokens;
                    session.tokens.output = usage.output_tokens;
                    session.tokens.reasoning = usage.reasoning_output_tokens;
                    session.tokens.total = usage.total_tokens;
                }
                _ => {}
            },

            _ => {}
        }
    }

    session.started_at = first_ts;
    session.ended_at = last_ts;

    if session.tokens.total == 0 {
        let (input_chars, output_chars) = transcript_char_counts(&session.messages);
        session.tokens = estimate_tokens_from_chars(input_chars, output_chars);
    }
    session.cost = estimate_cost(Source::Codex, &session.tokens);

    session
}

/// Concatenation of text content items, in order, with no separator.
fn extract_message_text(content: &[MessageContent]) -> String {
    content
        .iter()
        .filter_map(|item| match item {
            MessageContent::InputText { text } | MessageContent::OutputText { text } => {
                Some(text.as_str())
            }
            MessageContent::Unknown => None,
        })
        .collect()
}

/// user/developer messages count as model input, everything else as output.
fn transcript_char_counts(messages: &[ParsedMessage]) -> (usize, usize) {
    let mut input_chars = 0;
    let mut output_chars = 0;
    for msg in messages {
        if msg.role == "user" || msg.role == "developer" {
            input_chars += msg.content.len();
        } else {
            output_chars += msg.content.len();
        }
    }
    (input_chars, output_chars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::SessionSource;

    fn parse(text: &str) -> ParsedSession {
        assemble(text)
    }

    #[test]
    fn empty_file_yields_empty_session() {
        let session = parse("");
        assert_eq!(session, ParsedSession::empty(Source::Codex));
    }

    #[test]
    fn session_meta_populates_identity() {
        let session = parse(concat!(
            r#"{"type":"session_meta","timestamp":"2025-03-01T10:00:00Z","payload":"#,
            r#"{"id":"sess-1","cwd":"/work/proj","originator":"codex_cli","model_provider":"openai","timestamp":"2025-03-01T09:59:58Z"}}"#,
        ));
        assert_eq!(session.external_id, "sess-1");
        assert_eq!(session.project_path, "/work/proj");
        assert_eq!(session.model, "codex_cli");
        assert_eq!(session.provider, "openai");
        assert_eq!(
            session.started_at.unwrap().to_rfc3339(),
            "2025-03-01T10:00:00+00:00"
        );
    }

    #[test]
    fn turn_context_model_overrides_originator() {
        let session = parse(concat!(
            r#"{"type":"session_meta","timestamp":"2025-03-01T10:00:00Z","payload":{"id":"s","originator":"A"}}"#,
            "\n",
            r#"{"type":"turn_context","timestamp":"2025-03-01T10:00:01Z","payload":{"model":"B"}}"#,
        ));
        assert_eq!(session.model, "B");
    }

    #[test]
    fn external_id_is_set_once() {
        let session = parse(concat!(
            r#"{"type":"session_meta","timestamp":"2025-03-01T10:00:00Z","payload":{"id":"first"}}"#,
            "\n",
            r#"{"type":"session_meta","timestamp":"2025-03-01T10:00:05Z","payload":{"id":"second"}}"#,
        ));
        assert_eq!(session.external_id, "first");
    }

    #[test]
    fn message_text_concatenates_without_separator() {
        let session = parse(concat!(
            r#"{"type":"response_item","timestamp":"2025-03-01T10:00:02Z","payload":"#,
            r#"{"type":"message","role":"assistant","content":[{"type":"output_text","text":"Hello"},{"type":"image","url":"x"},{"type":"output_text","text":" world"}]}}"#,
        ));
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].content, "Hello world");
        assert_eq!(session.messages[0].role, "assistant");
    }

    #[test]
    fn empty_message_is_dropped() {
        let session = parse(concat!(
            r#"{"type":"response_item","timestamp":"2025-03-01T10:00:02Z","payload":"#,
            r#"{"type":"message","role":"assistant","content":[{"type":"image","url":"x"}]}}"#,
        ));
        assert!(session.messages.is_empty());
    }

    #[test]
    fn non_message_response_items_are_ignored() {
        let session = parse(concat!(
            r#"{"type":"response_item","timestamp":"2025-03-01T10:00:02Z","payload":"#,
            r#"{"type":"reasoning","role":"assistant","content":[{"type":"output_text","text":"hmm"}]}}"#,
        ));
        assert!(session.messages.is_empty());
    }

    #[test]
    fn tool_use_captures_name_and_arguments() {
        let session = parse(concat!(
            r#"{"type":"event_msg","timestamp":"2025-03-01T10:00:03Z","payload":"#,
            r#"{"type":"tool_use","name":"shell","input":{"command":"ls -la"}}}"#,
        ));
        assert_eq!(session.tool_calls.len(), 1);
        assert_eq!(session.tool_calls[0].tool_name, "shell");
        assert_eq!(session.tool_calls[0].arguments, r#"{"command":"ls -la"}"#);
        assert!(session.tool_calls[0].result.is_empty());
    }

    #[test]
    fn token_count_overwrites_previous_totals() {
        let session = parse(concat!(
            r#"{"type":"event_msg","timestamp":"2025-03-01T10:00:04Z","payload":"#,
            r#"{"type":"token_count","info":{"total_token_usage":{"input_tokens":100,"cached_input_tokens":10,"output_tokens":50,"reasoning_output_tokens":5,"total_tokens":150}}}}"#,
            "\n",
            r#"{"type":"event_msg","timestamp":"2025-03-01T10:00:05Z","payload":"#,
            r#"{"type":"token_count","info":{"total_token_usage":{"input_tokens":200,"cached_input_tokens":20,"output_tokens":80,"reasoning_output_tokens":8,"total_tokens":280}}}}"#,
        ));
        assert_eq!(session.tokens.input, 200);
        assert_eq!(session.tokens.cache_read, 20);
        assert_eq!(session.tokens.output, 80);
        assert_eq!(session.tokens.reasoning, 8);
        assert_eq!(session.tokens.total, 280);
        assert_eq!(session.cost, 200.0 * 3.0 / 1e6 + 80.0 * 15.0 / 1e6);
    }

    #[test]
    fn tokens_are_estimated_when_no_token_count_event() {
        // 10 input chars, 13 output chars -> 2 / 3 / 5 tokens.
        let session = parse(concat!(
            r#"{"type":"response_item","timestamp":"2025-03-01T10:00:01Z","payload":"#,
            r#"{"type":"message","role":"user","content":[{"type":"input_text","text":"aaaaaaaaaa"}]}}"#,
            "\n",
            r#"{"type":"response_item","timestamp":"2025-03-01T10:00:02Z","payload":"#,
            r#"{"type":"message","role":"assistant","content":[{"type":"output_text","text":"bbbbbbbbbbbbb"}]}}"#,
        ));
        assert_eq!(session.tokens.input, 2);
        assert_eq!(session.tokens.output, 3);
        assert_eq!(session.tokens.total, 5);
        assert_eq!(session.tokens.cache_read, 0);
        assert_eq!(session.tokens.reasoning, 0);
        assert_eq!(session.cost, 2.0 * 3.0 / 1e6 + 3.0 * 15.0 / 1e6);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let session = parse(concat!(
            "not json at all\n",
            r#"{"type":"session_meta","timestamp":"2025-03-01T10:00:00Z","payload":{"id":"s"}}"#,
            "\n",
            "{truncated",
        ));
        assert_eq!(session.external_id, "s");
    }

    #[test]
    fn unknown_record_types_still_advance_timestamps() {
        let session = parse(concat!(
            r#"{"type":"ghost_snapshot","timestamp":"2025-03-01T10:00:00Z","payload":{}}"#,
            "\n",
            r#"{"type":"compacted","timestamp":"2025-03-01T11:00:00Z","payload":{}}"#,
        ));
        assert_eq!(
            session.started_at.unwrap().to_rfc3339(),
            "2025-03-01T10:00:00+00:00"
        );
        assert_eq!(
            session.ended_at.unwrap().to_rfc3339(),
            "2025-03-01T11:00:00+00:00"
        );
    }

    #[test]
    fn unparsable_timestamp_does_not_block_the_record() {
        let session = parse(concat!(
            r#"{"type":"session_meta","timestamp":"not-a-time","payload":{"id":"s"}}"#,
            "\n",
            r#"{"type":"turn_context","timestamp":"2025-03-01T10:00:01Z","payload":{"model":"m"}}"#,
        ));
        assert_eq!(session.external_id, "s");
        // First parseable timestamp wins for started_at.
        assert_eq!(
            session.started_at.unwrap().to_rfc3339(),
            "2025-03-01T10:00:01+00:00"
        );
    }

    #[test]
    fn parse_file_reports_missing_path() {
        let err = CodexParser
            .parse_file(Path::new("/nonexistent/rollout.jsonl"))
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/rollout.jsonl"));
    }

    #[test]
    fn parse_file_reads_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rollout-abc.jsonl");
        std::fs::write(
            &path,
            r#"{"type":"session_meta","timestamp":"2025-03-01T10:00:00Z","payload":{"id":"abc"}}"#,
        )
        .unwrap();

        let session = CodexParser.parse_file(&path).unwrap();
        assert_eq!(session.external_id, "abc");
        assert_eq!(session.source, Source::Codex);
    }
}

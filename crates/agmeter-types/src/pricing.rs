use crate::session::{Source, TokenUsage};

// Price table, USD per million tokens. Best-effort estimates from public
// list prices, not billing data; token counts are the fidelity target.
const CODEX_INPUT_PER_M: f64 = 3.0;
const CODEX_OUTPUT_PER_M: f64 = 15.0;

const CLAUDE_INPUT_PER_M: f64 = 3.0;
const CLAUDE_OUTPUT_PER_M: f64 = 15.0;
const CLAUDE_CACHE_CREATION_PER_M: f64 = 3.75;
const CLAUDE_CACHE_READ_PER_M: f64 = 0.30;

const TOKENS_PER_M: f64 = 1_000_000.0;

/// Estimated USD cost for a session's final token totals.
///
/// Codex sessions are charged on input/output only; cached and reasoning
/// tokens carry no separate rate for that source. Claude sessions use the
/// four-component rate. Terms are summed without intermediate rounding.
pub fn estimate_cost(source: Source, tokens: &TokenUsage) -> f64 {
    match source {
        Source::Codex => {
            tokens.input as f64 * CODEX_INPUT_PER_M / TOKENS_PER_M
                + tokens.output as f64 * CODEX_OUTPUT_PER_M / TOKENS_PER_M
        }
        Source::Claude => {
            tokens.input as f64 * CLAUDE_INPUT_PER_M / TOKENS_PER_M
                + tokens.output as f64 * CLAUDE_OUTPUT_PER_M / TOKENS_PER_M
                + tokens.cache_creation as f64 * CLAUDE_CACHE_CREATION_PER_M / TOKENS_PER_M
                + tokens.cache_read as f64 * CLAUDE_CACHE_READ_PER_M / TOKENS_PER_M
        }
    }
}

/// Fallback token estimate from transcript character counts, used when a
/// Codex log never reported real usage. Roughly 4 characters per token,
/// truncating; cache and reasoning counters stay zero.
pub fn estimate_tokens_from_chars(input_chars: usize, output_chars: usize) -> TokenUsage {
    let input = (input_chars / 4) as u64;
    let output = (output_chars / 4) as u64;
    TokenUsage {
        input,
        output,
        total: input + output,
        ..TokenUsage::default()
    }
}

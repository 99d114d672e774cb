pub mod period;
pub mod pricing;
pub mod session;

pub use period::Period;
pub use pricing::{estimate_cost, estimate_tokens_from_chars};
pub use session::{ParsedMessage, ParsedSession, ParsedToolCall, Source, TokenUsage};

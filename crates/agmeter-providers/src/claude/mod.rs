mod parser;
mod schema;

pub use parser::ClaudeParser;

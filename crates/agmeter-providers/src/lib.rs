// Error types
pub mod error;

// Trait-based parser API
pub mod traits;

// Format implementations
pub mod claude;
pub mod codex;

// Log file discovery
pub mod discovery;

// Parser registry
pub mod registry;

// Timestamp handling shared by both formats
pub(crate) mod timestamp;

pub use claude::ClaudeParser;
pub use codex::CodexParser;
pub use discovery::find_session_files;
pub use error::{Error, Result};
pub use registry::{SourceMetadata, default_log_root, parser_for, source_metadata};
pub use traits::SessionSource;

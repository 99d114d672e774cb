use crate::traits::SessionSource;
use agmeter_types::Source;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct SourceMetadata {
    pub source: Source,
    pub description: &'static str,
    pub default_log_path: &'static str,
}

const SOURCES: &[SourceMetadata] = &[
    SourceMetadata {
        source: Source::Codex,
        description: "Codex CLI",
        default_log_path: "~/.codex/sessions",
    },
    SourceMetadata {
        source: Source::Claude,
        description: "Claude Code",
        default_log_path: "~/.claude/projects",
    },
];

pub fn source_metadata(source: Source) -> &'static SourceMetadata {
    // SOURCES covers every Source variant
    SOURCES.iter().find(|m| m.source == source).unwrap()
}

/// The parser for a given source, resolved at compile time per variant.
pub fn parser_for(source: Source) -> Box<dyn SessionSource> {
    match source {
        Source::Codex => Box::new(crate::codex::CodexParser),
        Source::Claude => Box::new(crate::claude::ClaudeParser),
    }
}

/// Default log root for a source, with the home directory expanded.
/// None when the home directory cannot be determined.
pub fn default_log_root(source: Source) -> Option<PathBuf> {
    expand_home_path(source_metadata(source).default_log_path)
}

fn expand_home_path(path: &str) -> Option<PathBuf> {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return Some(home.join(stripped));
    }
    None
}

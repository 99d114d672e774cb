use crate::Result;
use agmeter_types::{ParsedSession, Source};
use std::path::Path;

/// One log format's decoder + assembler.
///
/// Implementations fold the newline-delimited JSON records of a single
/// session file into one canonical [`ParsedSession`]. Parsing must be
/// error-tolerant: malformed lines are skipped, unparsable timestamps
/// become missing values, and an empty file yields an empty session.
pub trait SessionSource: Send + Sync {
    /// The source this parser handles.
    fn source(&self) -> Source;

    /// Parse a whole session log file.
    ///
    /// Only a file read failure is an error; decode problems inside the
    /// file degrade completeness silently.
    fn parse_file(&self, path: &Path) -> Result<ParsedSession>;
}

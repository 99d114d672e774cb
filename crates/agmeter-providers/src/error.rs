use std::fmt;
use std::path::PathBuf;

/// Result type for agmeter-providers operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the providers layer
///
/// Malformed log lines are not errors: parsers skip them and continue.
/// Only whole-file failures surface here.
#[derive(Debug)]
pub enum Error {
    /// Session log file could not be read
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Read { path, source } => {
                write!(f, "failed to read session log {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read { source, .. } => Some(source),
        }
    }
}

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively collect `*.jsonl` session files under a log root.
///
/// Unreadable directory entries are skipped rather than failing the scan;
/// a missing root yields an empty list. Results are sorted by path so
/// repeated syncs visit files in a stable order.
pub fn find_session_files(log_root: &Path) -> Vec<PathBuf> {
    if !log_root.exists() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(log_root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "jsonl")
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

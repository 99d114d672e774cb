use agmeter_providers::{find_session_files, parser_for};
use agmeter_store::{Database, Outcome};
use agmeter_types::Source;
use chrono::Utc;
use std::path::Path;

use crate::Result;

/// Tally of one sync pass over a source's log directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub inserted: usize,
    pub backfilled: usize,
    pub already_tracked: usize,
    /// Files that failed to parse or persist; the pass continues past them.
    pub errors: usize,
}

impl SyncReport {
    pub fn activity(&self) -> usize {
        self.inserted + self.backfilled + self.already_tracked
    }
}

pub struct SyncService<'a> {
    db: &'a Database,
}

impl<'a> SyncService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Parse every session file under `log_root` and reconcile each into
    /// the store. A missing or empty directory is a no-op, not an error.
    /// A parse or store failure is confined to its file: the pass counts
    /// it and moves on. The source's last-sync stamp is updated whenever
    /// any session was seen, including ones already tracked.
    pub fn sync(&self, source: Source, log_root: &Path) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        let files = find_session_files(log_root);
        if files.is_empty() {
            return Ok(report);
        }

        let parser = parser_for(source);
        for path in &files {
            let session = match parser.parse_file(path) {
                Ok(session) => session,
                Err(_) => {
                    report.errors += 1;
                    continue;
                }
            };

            match self.db.reconcile(&session) {
                Ok(Outcome::Inserted) => report.inserted += 1,
                Ok(Outcome::Backfilled) => report.backfilled += 1,
                Ok(Outcome::AlreadyTracked) => report.already_tracked += 1,
                Err(_) => report.errors += 1,
            }
        }

        if report.activity() > 0 {
            self.db
                .set_last_sync_time(source.as_str(), Utc::now().timestamp())?;
        }

        Ok(report)
    }
}

use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

use crate::error::{Error, Result};
use crate::records::{MessageRow, SessionRow, ToolCallRow};
use agmeter_types::{ParsedMessage, ParsedSession, ParsedToolCall};

/// What happened to a session during reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// New session row written, with its messages and tool calls.
    Inserted,
    /// Session existed without messages; the transcript was filled in.
    /// Scalar columns are left untouched.
    Backfilled,
    /// Session existed and needed nothing.
    AlreadyTracked,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                external_id TEXT UNIQUE,
                source TEXT NOT NULL,
                project_path TEXT,
                model TEXT,
                provider TEXT,
                started_at INTEGER NOT NULL,
                ended_at INTEGER,
                input_tokens INTEGER DEFAULT 0,
                output_tokens INTEGER DEFAULT 0,
                cache_creation_tokens INTEGER DEFAULT 0,
                cache_read_tokens INTEGER DEFAULT 0,
                total_tokens INTEGER DEFAULT 0,
                cost REAL DEFAULT 0,
                reasoning_tokens INTEGER DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id INTEGER NOT NULL,
                role TEXT NOT NULL,
                content TEXT,
                timestamp INTEGER NOT NULL,
                FOREIGN KEY (session_id) REFERENCES sessions(id)
            );

            CREATE TABLE IF NOT EXISTS tool_calls (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id INTEGER NOT NULL,
                tool_name TEXT NOT NULL,
                arguments TEXT,
                result TEXT,
                timestamp INTEGER NOT NULL,
                FOREIGN KEY (session_id) REFERENCES sessions(id)
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_external_id ON sessions(external_id);
            CREATE INDEX IF NOT EXISTS idx_messages_session_id ON messages(session_id);
            CREATE INDEX IF NOT EXISTS idx_tool_calls_session_id ON tool_calls(session_id);

            CREATE TABLE IF NOT EXISTS metadata (
                key TEXT PRIMARY KEY,
                value TEXT,
                updated_at INTEGER
            );
            "#,
        )?;

        // Databases created before the cache/reasoning columns existed need
        // them added. SQLite has no ALTER TABLE IF NOT EXISTS, so errors
        // from re-adding are ignored.
        let _ = self
            .conn
            .execute("ALTER TABLE sessions ADD COLUMN cache_creation_tokens INTEGER DEFAULT 0", []);
        let _ = self
            .conn
            .execute("ALTER TABLE sessions ADD COLUMN cache_read_tokens INTEGER DEFAULT 0", []);
        let _ = self
            .conn
            .execute("ALTER TABLE sessions ADD COLUMN reasoning_tokens INTEGER DEFAULT 0", []);

        Ok(())
    }

    /// Persist a parsed session, deduplicating on its external id.
    ///
    /// A session already in the database is never rewritten; the one
    /// exception is transcript backfill, when the stored row has no
    /// messages and the incoming parse carries some. Two syncs racing on
    /// the same external id resolve via the UNIQUE constraint: the loser
    /// observes `AlreadyTracked`.
    pub fn reconcile(&self, session: &ParsedSession) -> Result<Outcome> {
        if let Some(existing) = self.get_session_by_external_id(&session.external_id)? {
            if !session.messages.is_empty() {
                let count = self.message_count_for_session(existing.id)?;
                if count == 0 {
                    for msg in &session.messages {
                        self.insert_message(existing.id, msg)?;
                    }
                    return Ok(Outcome::Backfilled);
                }
            }
            return Ok(Outcome::AlreadyTracked);
        }

        let Some(session_id) = self.try_insert_session(session)? else {
            return Ok(Outcome::AlreadyTracked);
        };

        for msg in &session.messages {
            self.insert_message(session_id, msg)?;
        }
        for tc in &session.tool_calls {
            self.insert_tool_call(session_id, tc)?;
        }

        Ok(Outcome::Inserted)
    }

    /// Insert a session row, treating a lost race on the external_id
    /// UNIQUE constraint as "someone else got here first" (None) rather
    /// than an error.
    fn try_insert_session(&self, session: &ParsedSession) -> Result<Option<i64>> {
        match self.insert_session(session) {
            Ok(id) => Ok(Some(id)),
            Err(Error::Database(err)) if is_unique_violation(&err) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn insert_session(&self, session: &ParsedSession) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO sessions (external_id, source, project_path, model, provider, started_at, ended_at,
                input_tokens, output_tokens, cache_creation_tokens, cache_read_tokens, reasoning_tokens, total_tokens, cost)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                &session.external_id,
                session.source.as_str(),
                &session.project_path,
                &session.model,
                &session.provider,
                session.started_at.map(|t| t.timestamp()).unwrap_or(0),
                session.ended_at.map(|t| t.timestamp()),
                session.tokens.input as i64,
                session.tokens.output as i64,
                session.tokens.cache_creation as i64,
                session.tokens.cache_read as i64,
                session.tokens.reasoning as i64,
                session.tokens.total as i64,
                session.cost,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn insert_message(&self, session_id: i64, msg: &ParsedMessage) -> Result<()> {
        self.conn.execute(
            "INSERT INTO messages (session_id, role, content, timestamp) VALUES (?1, ?2, ?3, ?4)",
            params![
                session_id,
                &msg.role,
                &msg.content,
                msg.timestamp.map(|t| t.timestamp()).unwrap_or(0),
            ],
        )?;
        Ok(())
    }

    fn insert_tool_call(&self, session_id: i64, tc: &ParsedToolCall) -> Result<()> {
        self.conn.execute(
            "INSERT INTO tool_calls (session_id, tool_name, arguments, result, timestamp) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                session_id,
                &tc.tool_name,
                &tc.arguments,
                &tc.result,
                tc.timestamp.map(|t| t.timestamp()).unwrap_or(0),
            ],
        )?;
        Ok(())
    }

    pub fn get_session_by_external_id(&self, external_id: &str) -> Result<Option<SessionRow>> {
        let result = self
            .conn
            .query_row(
                r#"
                SELECT id, external_id, source, project_path, model, provider, started_at, ended_at,
                    input_tokens, output_tokens, cache_creation_tokens, cache_read_tokens, reasoning_tokens, total_tokens, cost
                FROM sessions WHERE external_id = ?1
                "#,
                [external_id],
                scan_session,
            )
            .optional()?;

        Ok(result)
    }

    pub fn message_count_for_session(&self, session_id: i64) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COALESCE(COUNT(*), 0) FROM messages WHERE session_id = ?1",
            [session_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn get_messages(&self, session_id: i64) -> Result<Vec<MessageRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, role, content, timestamp FROM messages WHERE session_id = ?1 ORDER BY timestamp",
        )?;

        let messages = stmt
            .query_map([session_id], |row| {
                Ok(MessageRow {
                    id: row.get(0)?,
                    session_id: row.get(1)?,
                    role: row.get(2)?,
                    content: row.get(3)?,
                    timestamp: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(messages)
    }

    pub fn get_tool_calls(&self, session_id: i64) -> Result<Vec<ToolCallRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, tool_name, arguments, result, timestamp FROM tool_calls WHERE session_id = ?1 ORDER BY timestamp",
        )?;

        let tool_calls = stmt
            .query_map([session_id], |row| {
                Ok(ToolCallRow {
                    id: row.get(0)?,
                    session_id: row.get(1)?,
                    tool_name: row.get(2)?,
                    arguments: row.get(3)?,
                    result: row.get(4)?,
                    timestamp: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(tool_calls)
    }

    /// Record when a source was last synced, as a unix timestamp.
    pub fn set_last_sync_time(&self, source: &str, timestamp: i64) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![
                format!("last_sync_{source}"),
                timestamp.to_string(),
                timestamp
            ],
        )?;
        Ok(())
    }

    /// Last sync time for a source; 0 if it was never synced.
    pub fn get_last_sync_time(&self, source: &str) -> Result<i64> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM metadata WHERE key = ?1",
                [format!("last_sync_{source}")],
                |row| row.get(0),
            )
            .optional()?;

        match value {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::Query(format!("invalid last sync timestamp: {raw}"))),
            None => Ok(0),
        }
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}

pub(crate) fn scan_session(row: &rusqlite::Row<'_>) -> rusqlite::Result<SessionRow> {
    Ok(SessionRow {
        id: row.get(0)?,
        external_id: row.get(1)?,
        source: row.get(2)?,
        project_path: row.get(3)?,
        model: row.get(4)?,
        provider: row.get(5)?,
        started_at: row.get(6)?,
        ended_at: row.get(7)?,
        input_tokens: row.get(8)?,
        output_tokens: row.get(9)?,
        cache_creation_tokens: row.get(10)?,
        cache_read_tokens: row.get(11)?,
        reasoning_tokens: row.get(12)?,
        total_tokens: row.get(13)?,
        cost: row.get(14)?,
        message_count: 0,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

//! SQLite implementation of the conversation store.
//!
//! Two tables: `talk_latest` holds the live turn window, `talk_old` holds
//! rolled-up summaries of archived turns. Connections are opened per
//! operation; the schema is created on first use.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use crate::conversation::{ConversationStore, SubjectKey, Turn, TurnRole};
use crate::errors::StoreError;

/// Live turns fetched for prompt assembly. Older turns are only reachable
/// through the archived summary.
pub const HISTORY_WINDOW: usize = 20;

/// Live-turn count at which the oldest turns get rolled up.
pub const ARCHIVE_THRESHOLD: usize = 40;

/// How many of the oldest live turns one rollup archives.
pub const ARCHIVE_BATCH: usize = 20;

/// SQLite-backed conversation store.
pub struct SqliteConversationStore {
    /// Path to the SQLite database file.
    pub db_path: PathBuf,
}

impl SqliteConversationStore {
    /// Open (and initialize) a store at `db_path`.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref().to_path_buf();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let store = Self { db_path };
        store.initialize_db()?;
        Ok(store)
    }

    fn open(&self) -> Result<Connection, StoreError> {
        Connection::open(&self.db_path).map_err(|e| {
            log::error!(
                "conversation store: failed to open {}: {}",
                self.db_path.display(),
                e
            );
            StoreError::Sqlite(e)
        })
    }

    fn initialize_db(&self) -> Result<(), StoreError> {
        let conn = self.open()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS talk_latest (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                subject_seq INTEGER NOT NULL,
                talk_seq INTEGER NOT NULL,
                from_to TEXT NOT NULL,
                talk_history TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS talk_old (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                subject_seq INTEGER NOT NULL,
                talk_history TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Number of live turns for `subject`.
    pub fn live_turn_count(&self, subject: &SubjectKey) -> Result<usize, StoreError> {
        let conn = self.open()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM talk_latest WHERE name = ?1 AND subject_seq = ?2",
            params![subject.user_name, subject.subject_seq],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Whether the live window has grown enough to warrant a rollup.
    pub fn should_archive(&self, subject: &SubjectKey) -> Result<bool, StoreError> {
        Ok(self.live_turn_count(subject)? >= ARCHIVE_THRESHOLD)
    }

    /// Roll the oldest [`ARCHIVE_BATCH`] live turns into one summary row.
    ///
    /// The summary is the role-tagged concatenation of the archived turns.
    /// A no-op when there is nothing to archive.
    pub fn archive_oldest(&self, subject: &SubjectKey) -> Result<(), StoreError> {
        let conn = self.open()?;
        let mut stmt = conn.prepare(
            "SELECT id, from_to, talk_history FROM talk_latest
             WHERE name = ?1 AND subject_seq = ?2
             ORDER BY talk_seq ASC LIMIT ?3",
        )?;
        let rows = stmt.query_map(
            params![subject.user_name, subject.subject_seq, ARCHIVE_BATCH as i64],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )?;

        let mut ids = Vec::new();
        let mut summary = String::from("이전 대화 요약:\n");
        for row in rows {
            let (id, from_to, text) = row?;
            summary.push_str(&format!("{}: {}\n", from_to, text));
            ids.push(id);
        }
        drop(stmt);

        if ids.is_empty() {
            return Ok(());
        }

        conn.execute(
            "INSERT INTO talk_old (name, subject_seq, talk_history, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                subject.user_name,
                subject.subject_seq,
                summary,
                chrono::Utc::now().to_rfc3339()
            ],
        )?;
        for id in ids {
            conn.execute("DELETE FROM talk_latest WHERE id = ?1", params![id])?;
        }
        Ok(())
    }
}

impl ConversationStore for SqliteConversationStore {
    fn append_turn(
        &self,
        subject: &SubjectKey,
        sequence_no: i64,
        role: TurnRole,
        text: &str,
    ) -> Result<(), StoreError> {
        let conn = self.open()?;
        conn.execute(
            "INSERT INTO talk_latest (name, subject_seq, talk_seq, from_to, talk_history, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                subject.user_name,
                subject.subject_seq,
                sequence_no,
                role.as_tag(),
                text,
                chrono::Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    fn fetch_turns(&self, subject: &SubjectKey) -> Result<Vec<Turn>, StoreError> {
        let conn = self.open()?;
        // Newest window first, then reversed back into chronological order.
        let mut stmt = conn.prepare(
            "SELECT from_to, talk_history FROM talk_latest
             WHERE name = ?1 AND subject_seq = ?2
             ORDER BY talk_seq DESC LIMIT ?3",
        )?;
        let rows = stmt.query_map(
            params![subject.user_name, subject.subject_seq, HISTORY_WINDOW as i64],
            |row| {
                Ok(Turn {
                    role: TurnRole::from_tag(&row.get::<_, String>(0)?),
                    text: row.get(1)?,
                })
            },
        )?;
        let mut turns = Vec::new();
        for row in rows {
            turns.push(row?);
        }
        turns.reverse();
        Ok(turns)
    }

    fn fetch_latest_sequence(&self, subject: &SubjectKey) -> Result<i64, StoreError> {
        let conn = self.open()?;
        let latest: Option<i64> = conn
            .query_row(
                "SELECT talk_seq FROM talk_latest
                 WHERE name = ?1 AND subject_seq = ?2
                 ORDER BY talk_seq DESC LIMIT 1",
                params![subject.user_name, subject.subject_seq],
                |row| row.get(0),
            )
            .optional()?;
        Ok(latest.unwrap_or(0))
    }

    fn fetch_archived_summary(&self, subject: &SubjectKey) -> Result<Option<String>, StoreError> {
        let conn = self.open()?;
        let summary: Option<String> = conn
            .query_row(
                "SELECT talk_history FROM talk_old
                 WHERE name = ?1 AND subject_seq = ?2
                 ORDER BY id DESC LIMIT 1",
                params![subject.user_name, subject.subject_seq],
                |row| row.get(0),
            )
            .optional()?;
        Ok(summary)
    }

    fn maybe_archive(&self, subject: &SubjectKey) -> Result<(), StoreError> {
        if self.should_archive(subject)? {
            self.archive_oldest(subject)?;
        }
        Ok(())
    }

    fn last_subject_seq(&self, user_name: &str) -> Result<i64, StoreError> {
        let conn = self.open()?;
        let latest: Option<i64> = conn
            .query_row(
                "SELECT subject_seq FROM talk_latest
                 WHERE name = ?1
                 ORDER BY subject_seq DESC LIMIT 1",
                params![user_name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(latest.unwrap_or(0))
    }
}

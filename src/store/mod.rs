use rusqlite::{Connection, Result};
use std::path::Path;

pub mod scores;
pub mod sentences;

/// Owns the SQLite connection and creates the schema on open.
#[derive(Debug)]
pub struct Db {
    conn: Connection,
}

impl Db {
    /// Opens (or creates) the database file and ensures the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CANTOPEN),
                    Some(format!("Failed to create directory: {}", e)),
                )
            })?;
        }

        let conn = Connection::open(path)?;
        Self::migrate(&conn)?;
        Ok(Db { conn })
    }

    /// In-memory database, used by tests and disposable runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::migrate(&conn)?;
        Ok(Db { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Mutable access for operations that need a transaction.
    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    fn migrate(conn: &Connection) -> Result<()> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS sentences (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL,
                word_count INTEGER NOT NULL,
                character_count INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS scores (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sentence_id INTEGER NOT NULL REFERENCES sentences(id),
                session_id TEXT NOT NULL,
                name TEXT NOT NULL DEFAULT '',
                words_per_minute REAL NOT NULL,
                accuracy_percentage INTEGER NOT NULL,
                time_taken INTEGER NOT NULL,
                submitted BOOLEAN NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        // Covers the per-session "latest" lookups
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_scores_session ON scores(session_id, submitted, created_at)",
            [],
        )?;

        // Covers the leaderboard ordering
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_scores_leaderboard ON scores(submitted, words_per_minute, time_taken)",
            [],
        )?;

        Ok(())
    }
}

//! SQLite persistence layer for memo records and settings.
//!
//! A single `memos` table holds both history entries and templates; the
//! `settings` table is a key/value store for preferences. Every call locks
//! the connection for its duration, so individual calls are atomic; multi
//! statement structural changes go through [`Database::transaction`].

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{params, Connection, Transaction};
use thiserror::Error;

use crate::models::{Memo, Scope};

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

const MEMO_COLUMNS: &str = "id, content, createdAt, isTemplate, folder, displayOrder";

/// Thread-safe database wrapper.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> DatabaseResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;
        ",
        )?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.setup_schema()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> DatabaseResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.setup_schema()?;
        Ok(db)
    }

    fn setup_schema(&self) -> DatabaseResult<()> {
        let conn = self.conn.lock();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS memos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                createdAt INTEGER NOT NULL,
                isTemplate INTEGER NOT NULL DEFAULT 0,
                folder TEXT,
                displayOrder INTEGER NOT NULL DEFAULT 0
            );
            CREATE INDEX IF NOT EXISTS idx_memos_kind ON memos(isTemplate);
            CREATE INDEX IF NOT EXISTS idx_memos_folder ON memos(folder);
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Run a multi-statement structural change as one atomic transaction.
    /// The closure sees a [`Transaction`]; an `Err` return rolls back.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&Transaction) -> DatabaseResult<T>,
    ) -> DatabaseResult<T> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Single-record operations
    // ─────────────────────────────────────────────────────────────────────

    /// Fetch one record by id.
    pub fn memo(&self, id: i64) -> DatabaseResult<Option<Memo>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare(&format!("SELECT {MEMO_COLUMNS} FROM memos WHERE id = ?1"))?;
        let result = stmt.query_row([id], row_to_memo);
        match result {
            Ok(memo) => Ok(Some(memo)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Update a record's content. Returns false when the id does not exist.
    pub fn update_content(&self, id: i64, content: &str) -> DatabaseResult<bool> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE memos SET content = ?1 WHERE id = ?2",
            params![content, id],
        )?;
        Ok(changed > 0)
    }

    /// Delete a record by id. Returns false when the id does not exist.
    pub fn delete_memo(&self, id: i64) -> DatabaseResult<bool> {
        let conn = self.conn.lock();
        let changed = conn.execute("DELETE FROM memos WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    /// Delete every history record.
    pub fn clear_history(&self) -> DatabaseResult<usize> {
        let conn = self.conn.lock();
        Ok(conn.execute("DELETE FROM memos WHERE isTemplate = 0", [])?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Scoped queries
    // ─────────────────────────────────────────────────────────────────────

    /// All records in a scope, ordered by display order (recency breaks
    /// ties, so scopes with rank gaps still list correctly).
    pub fn memos_in(&self, scope: &Scope) -> DatabaseResult<Vec<Memo>> {
        let conn = self.conn.lock();
        scope_memos(&conn, scope)
    }

    /// Distinct non-null folder names among templates, alphabetical.
    pub fn folders(&self) -> DatabaseResult<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT DISTINCT folder FROM memos
             WHERE isTemplate = 1 AND folder IS NOT NULL
             ORDER BY folder COLLATE NOCASE",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Every template across all folders, for the input-method keyboard
    /// view. Ordered by display order only, matching the flat IME list.
    pub fn all_templates(&self) -> DatabaseResult<Vec<Memo>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT {MEMO_COLUMNS} FROM memos
             WHERE isTemplate = 1
             ORDER BY displayOrder ASC, createdAt DESC"
        ))?;
        let memos = stmt
            .query_map([], row_to_memo)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(memos)
    }

    /// Case-insensitive substring search within a scope. An empty query
    /// returns the whole scope.
    pub fn search(&self, scope: &Scope, query: &str) -> DatabaseResult<Vec<Memo>> {
        if query.is_empty() {
            return self.memos_in(scope);
        }
        // Escape the escape character first so user backslashes survive.
        let pattern = format!(
            "%{}%",
            query
                .to_lowercase()
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_")
        );
        let conn = self.conn.lock();
        let memos = match scope {
            Scope::History => {
                let mut stmt = conn.prepare(&format!(
                    r#"SELECT {MEMO_COLUMNS} FROM memos
                       WHERE isTemplate = 0 AND LOWER(content) LIKE ?1 ESCAPE '\'
                       ORDER BY displayOrder ASC, createdAt DESC"#
                ))?;
                let rows = stmt
                    .query_map([&pattern], row_to_memo)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            Scope::Templates(folder) => {
                let mut stmt = conn.prepare(&format!(
                    r#"SELECT {MEMO_COLUMNS} FROM memos
                       WHERE isTemplate = 1 AND folder IS ?1
                             AND LOWER(content) LIKE ?2 ESCAPE '\'
                       ORDER BY displayOrder ASC, createdAt DESC"#
                ))?;
                let rows = stmt
                    .query_map(params![folder.as_deref(), pattern], row_to_memo)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(memos)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Settings key/value store
    // ─────────────────────────────────────────────────────────────────────

    pub fn setting(&self, key: &str) -> DatabaseResult<Option<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
        let result = stmt.query_row([key], |row| row.get::<_, String>(0));
        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set_setting(&self, key: &str, value: &str) -> DatabaseResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

/// Map a `memos` row (selected via [`MEMO_COLUMNS`]) to a [`Memo`].
pub(crate) fn row_to_memo(row: &rusqlite::Row) -> rusqlite::Result<Memo> {
    Ok(Memo {
        id: row.get(0)?,
        content: row.get(1)?,
        created_at: row.get(2)?,
        is_template: row.get::<_, i64>(3)? != 0,
        folder: row.get(4)?,
        display_order: row.get(5)?,
    })
}

/// Fetch one record by id on an already-locked connection (transaction use).
pub(crate) fn get_memo(conn: &Connection, id: i64) -> DatabaseResult<Option<Memo>> {
    let mut stmt = conn.prepare(&format!("SELECT {MEMO_COLUMNS} FROM memos WHERE id = ?1"))?;
    match stmt.query_row([id], row_to_memo) {
        Ok(memo) => Ok(Some(memo)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Scope-filtered listing usable both on the shared connection and inside a
/// transaction.
pub(crate) fn scope_memos(conn: &Connection, scope: &Scope) -> DatabaseResult<Vec<Memo>> {
    let memos = match scope {
        Scope::History => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MEMO_COLUMNS} FROM memos
                 WHERE isTemplate = 0
                 ORDER BY displayOrder ASC, createdAt DESC"
            ))?;
            let rows = stmt
                .query_map([], row_to_memo)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
        Scope::Templates(folder) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MEMO_COLUMNS} FROM memos
                 WHERE isTemplate = 1 AND folder IS ?1
                 ORDER BY displayOrder ASC, createdAt DESC"
            ))?;
            let rows = stmt
                .query_map([folder.as_deref()], row_to_memo)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        }
    };
    Ok(memos)
}

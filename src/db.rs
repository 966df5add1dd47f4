use crate::store::KvStore;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub const DB_FILE_NAME: &str = "gradebook.sqlite3";

/// Workspace-backed key-value store: one SQLite file per workspace directory.
pub struct SqliteStore {
    conn: Connection,
}

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE_NAME);
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_entries(
            key TEXT PRIMARY KEY,
            value BLOB NOT NULL,
            updated_at TEXT
        )",
        [],
    )?;

    Ok(conn)
}

impl SqliteStore {
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            conn: open_db(workspace)?,
        })
    }

    pub fn updated_at(&self, key: &str) -> anyhow::Result<Option<String>> {
        let v: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT updated_at FROM kv_entries WHERE key = ?",
                [key],
                |r| r.get(0),
            )
            .optional()?;
        Ok(v.flatten())
    }
}

impl KvStore for SqliteStore {
    fn load(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let v = self
            .conn
            .query_row("SELECT value FROM kv_entries WHERE key = ?", [key], |r| {
                r.get::<_, Vec<u8>>(0)
            })
            .optional()?;
        Ok(v)
    }

    fn save(&mut self, key: &str, bytes: &[u8]) -> anyhow::Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO kv_entries(key, value, updated_at)
             VALUES(?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET
               value = excluded.value,
               updated_at = excluded.updated_at",
            (key, bytes, &now),
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?", [key])?;
        Ok(())
    }
}

//! SQLite-backed key-value store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection};

use super::{data_dir, KvStore};
use crate::error::StoreError;

/// Stores values in a single `kv` table.
///
/// Statements are short and run inline on the calling task.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open the store at `<data_dir>/fasting.db`.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open() -> Result<Self, StoreError> {
        let dir = data_dir().map_err(|e| StoreError::OpenFailed {
            path: "<data dir>".into(),
            message: e.to_string(),
        })?;
        Self::open_path(&dir.join("fasting.db"))
    }

    pub fn open_path(path: &Path) -> Result<Self, StoreError> {
        let open_failed = |e: rusqlite::Error| StoreError::OpenFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        let conn = Connection::open(path).map_err(open_failed)?;
        Self::migrate(&conn).map_err(open_failed)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StoreError> {
        let open_failed = |e: rusqlite::Error| StoreError::OpenFailed {
            path: ":memory:".into(),
            message: e.to_string(),
        };
        let conn = Connection::open_in_memory().map_err(open_failed)?;
        Self::migrate(&conn).map_err(open_failed)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, String> {
        self.conn.lock().map_err(|e| e.to_string())
    }

    fn kv_get(&self, key: &str) -> Result<Option<String>, String> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT value FROM kv WHERE key = ?1")
            .map_err(|e| e.to_string())?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.to_string()),
        }
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<(), String> {
        self.conn()?
            .execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    /// Write every entry in one transaction. On failure nothing is written and
    /// the offending key is returned with the error.
    fn kv_set_many(&self, entries: &[(&str, &str)]) -> Result<(), (String, String)> {
        let first = entries.first().map(|(k, _)| k.to_string()).unwrap_or_default();
        let mut conn = self.conn().map_err(|e| (first.clone(), e))?;
        let tx = conn.transaction().map_err(|e| (first.clone(), e.to_string()))?;
        for (key, value) in entries {
            tx.execute(
                "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(|e| (key.to_string(), e.to_string()))?;
        }
        tx.commit().map_err(|e| (first, e.to_string()))
    }
}

#[async_trait]
impl KvStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.kv_get(key).map_err(|message| StoreError::ReadFailed {
            key: key.to_string(),
            message,
        })
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.kv_set(key, value).map_err(|message| StoreError::WriteFailed {
            key: key.to_string(),
            message,
        })
    }

    async fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        self.kv_set_many(entries)
            .map_err(|(key, message)| StoreError::WriteFailed { key, message })
    }
}

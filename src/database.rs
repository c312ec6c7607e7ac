use crate::dlog;
use crate::error::StorageError;
use crate::kv::KeyValueStore;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

/// Key-value slots in a single SQLite table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "opened sqlite store");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StorageError> {
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        dlog!("sqlite_get key={key} present={}", value.is_some());
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            r"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            ON CONFLICT (key) DO UPDATE SET
              value = EXCLUDED.value,
              updated_at = EXCLUDED.updated_at
            ",
            params![key, value],
        )?;
        dlog!("sqlite_set key={key} bytes={}", value.len());
        Ok(())
    }
}

fn ensure_schema(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS kv (
          key         TEXT PRIMARY KEY,
          value       TEXT NOT NULL,
          updated_at  TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_keeps_one_row_per_key() {
        let mut kv = SqliteStore::open_in_memory().unwrap();
        assert_eq!(kv.get("workouts").unwrap(), None);
        kv.set("workouts", "[1]").unwrap();
        kv.set("workouts", "[1,2]").unwrap();
        assert_eq!(kv.get("workouts").unwrap().as_deref(), Some("[1,2]"));

        let rows: i64 = kv
            .conn
            .query_row("SELECT COUNT(*) FROM kv", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn file_backed_store_persists_between_connections() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("mapty.sqlite");
        {
            let mut kv = SqliteStore::open(&path).unwrap();
            kv.set("workouts", "[]").unwrap();
        }
        let kv = SqliteStore::open(&path).unwrap();
        assert_eq!(kv.get("workouts").unwrap().as_deref(), Some("[]"));
    }
}

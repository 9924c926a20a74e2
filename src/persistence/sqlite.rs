use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::error::PersistenceError;
use crate::persistence::KeyValueStore;

const STORE_SCHEMA_VERSION: i64 = 1;

const STORE_DB_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS store_meta (
  id INTEGER PRIMARY KEY CHECK (id = 1),
  schema_version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS snapshots (
  snapshot_key TEXT PRIMARY KEY,
  snapshot_value BLOB NOT NULL,
  updated_at TEXT NOT NULL
);
"#;

const UPSERT_SNAPSHOT: &str = "INSERT INTO snapshots (snapshot_key, snapshot_value, updated_at) VALUES (?1, ?2, ?3) \
     ON CONFLICT(snapshot_key) DO UPDATE SET snapshot_value = excluded.snapshot_value, updated_at = excluded.updated_at";

/// Snapshot store backed by a single SQLite table.
pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, PersistenceError> {
        let mut store = Self { conn };
        store.conn.execute_batch(STORE_DB_SCHEMA)?;
        store.ensure_store_meta()?;
        Ok(store)
    }

    fn ensure_store_meta(&mut self) -> Result<(), PersistenceError> {
        let version = self
            .conn
            .query_row(
                "SELECT schema_version FROM store_meta WHERE id = 1",
                [],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        match version {
            Some(STORE_SCHEMA_VERSION) => Ok(()),
            Some(other) => Err(PersistenceError::InvalidData(format!(
                "store_meta version mismatch (schema {}, expected {})",
                other, STORE_SCHEMA_VERSION
            ))),
            None => {
                self.conn.execute(
                    "INSERT INTO store_meta (id, schema_version) VALUES (1, ?1)",
                    params![STORE_SCHEMA_VERSION],
                )?;
                Ok(())
            }
        }
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        let value = self
            .conn
            .query_row(
                "SELECT snapshot_value FROM snapshots WHERE snapshot_key = ?1",
                params![key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), PersistenceError> {
        self.conn.execute(
            UPSERT_SNAPSHOT,
            params![key, value, chrono::Utc::now().to_rfc3339()],
        )?;
        debug!(key, bytes = value.len(), "snapshot written");
        Ok(())
    }

    fn set_batch(&mut self, entries: &[(&str, Vec<u8>)]) -> Result<(), PersistenceError> {
        let now = chrono::Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        for (key, value) in entries {
            tx.execute(UPSERT_SNAPSHOT, params![key, value, now])?;
        }
        tx.commit()?;
        debug!(entries = entries.len(), "snapshot batch written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_reads_as_none() {
        let store = SqliteKvStore::open_in_memory().expect("open");
        assert_eq!(store.get("quest-user").expect("get"), None);
    }

    #[test]
    fn set_overwrites_existing_value() {
        let mut store = SqliteKvStore::open_in_memory().expect("open");
        store.set("quest-user", b"{\"v\":1}").expect("first write");
        store.set("quest-user", b"{\"v\":2}").expect("second write");
        assert_eq!(
            store.get("quest-user").expect("get"),
            Some(b"{\"v\":2}".to_vec())
        );
        let rows: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM snapshots", [], |row| row.get(0))
            .expect("count");
        assert_eq!(rows, 1);
    }

    #[test]
    fn batch_writes_all_entries() {
        let mut store = SqliteKvStore::open_in_memory().expect("open");
        store
            .set_batch(&[("a", b"1".to_vec()), ("b", b"2".to_vec())])
            .expect("batch");
        assert_eq!(store.get("a").expect("a"), Some(b"1".to_vec()));
        assert_eq!(store.get("b").expect("b"), Some(b"2".to_vec()));
    }

    #[test]
    fn reopening_a_file_keeps_snapshots() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("questline.db");
        {
            let mut store = SqliteKvStore::open(&path).expect("open");
            store.set("quest-quests", b"[]").expect("write");
        }
        let store = SqliteKvStore::open(&path).expect("reopen");
        assert_eq!(store.get("quest-quests").expect("get"), Some(b"[]".to_vec()));
    }

    #[test]
    fn unknown_schema_version_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("questline.db");
        {
            let conn = Connection::open(&path).expect("raw open");
            conn.execute_batch(STORE_DB_SCHEMA).expect("schema");
            conn.execute("INSERT INTO store_meta (id, schema_version) VALUES (1, 99)", [])
                .expect("meta");
        }
        assert!(matches!(
            SqliteKvStore::open(&path),
            Err(PersistenceError::InvalidData(_))
        ));
    }
}

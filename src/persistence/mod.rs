pub mod memory;
pub mod sqlite;

pub use memory::MemoryKvStore;
pub use sqlite::SqliteKvStore;

use crate::error::PersistenceError;

/// Per-install snapshot of the connected user.
pub const USER_SNAPSHOT_KEY: &str = "quest-user";
/// Global snapshot of the quest list and its counters.
pub const QUEST_LIST_SNAPSHOT_KEY: &str = "quest-quests";

/// Durable key-value storage for JSON snapshots.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError>;

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), PersistenceError>;

    /// Writes every entry or none of them. The default is only as atomic as
    /// the individual writes; adapters with transactions override it.
    fn set_batch(&mut self, entries: &[(&str, Vec<u8>)]) -> Result<(), PersistenceError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), PersistenceError> {
        (**self).set(key, value)
    }

    fn set_batch(&mut self, entries: &[(&str, Vec<u8>)]) -> Result<(), PersistenceError> {
        (**self).set_batch(entries)
    }
}

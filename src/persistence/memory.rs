use std::collections::HashMap;

use crate::error::PersistenceError;
use crate::persistence::KeyValueStore;

/// In-process store. Writes can be switched off to exercise failure paths.
#[derive(Debug, Default, Clone)]
pub struct MemoryKvStore {
    entries: HashMap<String, Vec<u8>>,
    reject_writes: bool,
    writes: u64,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_reject_writes(&mut self, reject: bool) {
        self.reject_writes = reject;
    }

    /// Successful writes so far; a batch counts once.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    fn check_writable(&self, key: &str) -> Result<(), PersistenceError> {
        if self.reject_writes {
            return Err(PersistenceError::WriteRejected {
                key: key.to_string(),
                reason: "store is read-only".to_string(),
            });
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<(), PersistenceError> {
        self.check_writable(key)?;
        self.entries.insert(key.to_string(), value.to_vec());
        self.writes += 1;
        Ok(())
    }

    fn set_batch(&mut self, entries: &[(&str, Vec<u8>)]) -> Result<(), PersistenceError> {
        if let Some((key, _)) = entries.first() {
            self.check_writable(key)?;
        }
        for (key, value) in entries {
            self.entries.insert(key.to_string(), value.clone());
        }
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_batch_leaves_previous_values() {
        let mut store = MemoryKvStore::new();
        store.set("a", b"old").expect("write");
        store.set_reject_writes(true);
        let result = store.set_batch(&[("a", b"new".to_vec()), ("b", b"x".to_vec())]);
        assert!(matches!(result, Err(PersistenceError::WriteRejected { .. })));
        assert_eq!(store.get("a").expect("a"), Some(b"old".to_vec()));
        assert_eq!(store.get("b").expect("b"), None);
        assert_eq!(store.writes(), 1);
    }
}

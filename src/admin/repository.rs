use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::admin::AdminQuest;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdminStoreError {
    #[error("admin quest store lock poisoned")]
    Poisoned,
}

/// Storage for admin quest records. Shared across request handlers.
pub trait AdminQuestRepository: Send + Sync {
    /// Reserves a fresh `quest-<millis>` id, never repeating one already handed out.
    fn next_id(&self, now: DateTime<Utc>) -> Result<String, AdminStoreError>;
    fn insert(&self, quest: AdminQuest) -> Result<(), AdminStoreError>;
    fn all(&self) -> Result<Vec<AdminQuest>, AdminStoreError>;
    fn find(&self, id: &str) -> Result<Option<AdminQuest>, AdminStoreError>;
    /// Replaces the record with the same id. `false` when there is none.
    fn replace(&self, quest: AdminQuest) -> Result<bool, AdminStoreError>;
    fn remove(&self, id: &str) -> Result<bool, AdminStoreError>;
}

#[derive(Debug, Default)]
struct AdminQuestTable {
    quests: Vec<AdminQuest>,
    last_millis: i64,
}

/// Process-local repository behind a single mutex.
#[derive(Debug, Default)]
pub struct InMemoryAdminQuests {
    table: Mutex<AdminQuestTable>,
}

impl InMemoryAdminQuests {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, AdminQuestTable>, AdminStoreError> {
        self.table.lock().map_err(|_| AdminStoreError::Poisoned)
    }
}

impl AdminQuestRepository for InMemoryAdminQuests {
    fn next_id(&self, now: DateTime<Utc>) -> Result<String, AdminStoreError> {
        let mut table = self.lock()?;
        let millis = now.timestamp_millis().max(table.last_millis + 1);
        table.last_millis = millis;
        Ok(format!("quest-{}", millis))
    }

    fn insert(&self, quest: AdminQuest) -> Result<(), AdminStoreError> {
        self.lock()?.quests.push(quest);
        Ok(())
    }

    fn all(&self) -> Result<Vec<AdminQuest>, AdminStoreError> {
        Ok(self.lock()?.quests.clone())
    }

    fn find(&self, id: &str) -> Result<Option<AdminQuest>, AdminStoreError> {
        Ok(self.lock()?.quests.iter().find(|quest| quest.id == id).cloned())
    }

    fn replace(&self, quest: AdminQuest) -> Result<bool, AdminStoreError> {
        let mut table = self.lock()?;
        match table.quests.iter_mut().find(|existing| existing.id == quest.id) {
            Some(existing) => {
                *existing = quest;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove(&self, id: &str) -> Result<bool, AdminStoreError> {
        let mut table = self.lock()?;
        let before = table.quests.len();
        table.quests.retain(|quest| quest.id != id);
        Ok(table.quests.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn ids_stay_unique_within_one_millisecond() {
        let repo = InMemoryAdminQuests::new();
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).single().expect("time");
        let a = repo.next_id(now).expect("id");
        let b = repo.next_id(now).expect("id");
        assert_eq!(a, "quest-1700000000000");
        assert_eq!(b, "quest-1700000000001");
    }
}

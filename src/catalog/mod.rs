
use bevy_ecs::prelude::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::content::{validate_unique_ids, QuestDefinition, QuestId};
use crate::data::seed_quests;
use crate::error::{Lookup, PersistenceError, QuestError};
use crate::persistence::{KeyValueStore, QUEST_LIST_SNAPSHOT_KEY};

/// A quest definition plus the aggregate counters kept beside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestRecord {
    #[serde(flatten)]
    pub definition: QuestDefinition,
    #[serde(default)]
    pub completions: u64,
    #[serde(default)]
    pub rating: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuestStats {
    pub completions: u64,
    pub rating: f32,
}

#[derive(Resource, Debug, Clone)]
pub struct QuestCatalog {
    key: String,
    records: Vec<QuestRecord>,
}

impl Default for QuestCatalog {
    fn default() -> Self {
        Self {
            key: QUEST_LIST_SNAPSHOT_KEY.to_string(),
            records: Vec::new(),
        }
    }
}

impl QuestCatalog {
    pub fn from_records(records: Vec<QuestRecord>) -> Result<Self, QuestError> {
        validate_unique_ids(records.iter().map(|record| &record.definition))?;
        Ok(Self {
            records,
            ..Self::default()
        })
    }

    pub fn seeded() -> Self {
        Self {
            records: seed_quests(),
            ..Self::default()
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Loads the quest-list snapshot, seeding and persisting the built-in
    /// quests on first use.
    pub fn load_or_seed(kv: &mut dyn KeyValueStore) -> Result<Self, QuestError> {
        let catalog = Self::default();
        if let Some(raw) = kv.get(&catalog.key)? {
            let records: Vec<QuestRecord> =
                serde_json::from_slice(&raw).map_err(PersistenceError::from)?;
            let catalog = Self::from_records(records)?;
            info!(quests = catalog.len(), "loaded quest catalog");
            return Ok(catalog);
        }

        let seeded = Self::seeded();
        kv.set(&seeded.key, &seeded.encode()?)?;
        info!(quests = seeded.len(), "seeded quest catalog");
        Ok(seeded)
    }

    pub fn encode(&self) -> Result<Vec<u8>, PersistenceError> {
        Ok(serde_json::to_vec(&self.records)?)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get_by_id(&self, id: &QuestId) -> Option<&QuestDefinition> {
        self.record(id).map(|record| &record.definition)
    }

    pub fn require(&self, id: &QuestId) -> Result<&QuestDefinition, QuestError> {
        self.get_by_id(id)
            .ok_or_else(|| QuestError::NotFound(Lookup::Quest(id.clone())))
    }

    pub fn record(&self, id: &QuestId) -> Option<&QuestRecord> {
        self.records.iter().find(|record| record.definition.id == *id)
    }

    pub fn stats(&self, id: &QuestId) -> Option<QuestStats> {
        self.record(id).map(|record| QuestStats {
            completions: record.completions,
            rating: record.rating,
        })
    }

    pub fn list(&self) -> impl Iterator<Item = &QuestRecord> + '_ {
        self.records.iter()
    }

    pub fn published(&self) -> impl Iterator<Item = &QuestRecord> + '_ {
        self.records
            .iter()
            .filter(|record| record.definition.is_published)
    }

    pub fn created_by<'a>(&'a self, creator_id: &'a str) -> impl Iterator<Item = &'a QuestRecord> + 'a {
        self.records
            .iter()
            .filter(move |record| record.definition.creator_id == creator_id)
    }

    /// Inserts a new quest or replaces the definition of an existing one,
    /// keeping its counters.
    pub fn upsert(&mut self, quest: QuestDefinition) -> Result<(), QuestError> {
        quest.validate()?;
        match self
            .records
            .iter_mut()
            .find(|record| record.definition.id == quest.id)
        {
            Some(record) => {
                debug!(quest = %quest.id, "replaced quest definition");
                record.definition = quest;
            }
            None => {
                debug!(quest = %quest.id, "added quest definition");
                self.records.push(QuestRecord {
                    definition: quest,
                    completions: 0,
                    rating: 0.0,
                });
            }
        }
        Ok(())
    }

    pub fn increment_completions(&mut self, id: &QuestId) -> Result<u64, QuestError> {
        let record = self
            .records
            .iter_mut()
            .find(|record| record.definition.id == *id)
            .ok_or_else(|| QuestError::NotFound(Lookup::Quest(id.clone())))?;
        record.completions = record.completions.saturating_add(1);
        Ok(record.completions)
    }

    /// `quest_<millis>`, moved past any id already in the catalog.
    pub fn next_quest_id(&self, now: DateTime<Utc>) -> QuestId {
        let mut millis = now.timestamp_millis();
        loop {
            let candidate = QuestId(format!("quest_{}", millis));
            if self.record(&candidate).is_none() {
                return candidate;
            }
            millis += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Difficulty, Step};
    use crate::persistence::MemoryKvStore;

    fn learn_quest(id: &str) -> QuestDefinition {
        QuestDefinition {
            id: QuestId::from(id),
            title: "Bridges".to_string(),
            description: "Moving assets between chains".to_string(),
            category: "DeFi Fundamentals".to_string(),
            creator_id: "user_1".to_string(),
            creator_name: "0x1234...5678".to_string(),
            xp: 40,
            duration: "4 min".to_string(),
            difficulty: Difficulty::Intermediate,
            steps: vec![Step::Learn {
                title: "What is a bridge?".to_string(),
                content: "A bridge locks assets on one chain.".to_string(),
            }],
            prize: None,
            is_published: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn lookup_finds_seeded_quests() {
        let catalog = QuestCatalog::seeded();
        assert!(catalog.get_by_id(&QuestId::from("first-swap")).is_some());
        assert!(catalog.get_by_id(&QuestId::from("missing")).is_none());
        assert!(matches!(
            catalog.require(&QuestId::from("missing")),
            Err(QuestError::NotFound(Lookup::Quest(_)))
        ));
        assert_eq!(
            catalog.stats(&QuestId::from("wallet-security")),
            Some(QuestStats {
                completions: 892,
                rating: 4.9
            })
        );
    }

    #[test]
    fn upsert_keeps_counters_of_existing_quests() {
        let mut catalog = QuestCatalog::seeded();
        let mut quest = learn_quest("bridges");
        catalog.upsert(quest.clone()).expect("insert");
        catalog
            .increment_completions(&quest.id)
            .expect("increment");

        quest.title = "Bridges 101".to_string();
        catalog.upsert(quest.clone()).expect("replace");
        let record = catalog.record(&quest.id).expect("record");
        assert_eq!(record.definition.title, "Bridges 101");
        assert_eq!(record.completions, 1);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn upsert_rejects_invalid_definitions() {
        let mut catalog = QuestCatalog::default();
        let mut quest = learn_quest("broken");
        quest.steps.clear();
        assert!(matches!(catalog.upsert(quest), Err(QuestError::Validation(_))));
        assert!(catalog.is_empty());
    }

    #[test]
    fn increment_unknown_quest_is_not_found() {
        let mut catalog = QuestCatalog::seeded();
        assert!(catalog
            .increment_completions(&QuestId::from("missing"))
            .is_err());
    }

    #[test]
    fn published_and_creator_filters() {
        let mut catalog = QuestCatalog::seeded();
        catalog.upsert(learn_quest("draft")).expect("insert");
        assert_eq!(catalog.published().count(), 2);
        assert_eq!(catalog.created_by("user_1").count(), 1);
    }

    #[test]
    fn load_or_seed_persists_seed_then_reloads_it() {
        let mut kv = MemoryKvStore::new();
        let mut seeded = QuestCatalog::load_or_seed(&mut kv).expect("seed");
        assert_eq!(kv.writes(), 1);
        seeded
            .increment_completions(&QuestId::from("first-swap"))
            .expect("increment");
        kv.set(seeded.key(), &seeded.encode().expect("encode"))
            .expect("write");

        let reloaded = QuestCatalog::load_or_seed(&mut kv).expect("reload");
        assert_eq!(
            reloaded
                .stats(&QuestId::from("first-swap"))
                .map(|stats| stats.completions),
            Some(1248)
        );
    }

    #[test]
    fn next_quest_id_skips_taken_ids() {
        let mut catalog = QuestCatalog::default();
        let now = DateTime::from_timestamp_millis(1_700_000_000_000).expect("timestamp");
        let first = catalog.next_quest_id(now);
        assert_eq!(first.as_str(), "quest_1700000000000");
        catalog.upsert(learn_quest(first.as_str())).expect("insert");
        assert_eq!(catalog.next_quest_id(now).as_str(), "quest_1700000000001");
    }
}

use bevy_ecs::prelude::*;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::persistence::{KeyValueStore, USER_SNAPSHOT_KEY};
use crate::progress::profile::{UserId, UserProfile};
use crate::rules::account;

/// Owns the canonical profile of the active user. The in-memory copy only
/// ever holds what has been written to the key-value store.
#[derive(Resource, Debug, Clone)]
pub struct ProgressStore {
    key: String,
    current: Option<UserProfile>,
}

impl Default for ProgressStore {
    fn default() -> Self {
        Self::new(USER_SNAPSHOT_KEY)
    }
}

impl ProgressStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            current: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn current(&self) -> Option<&UserProfile> {
        self.current.as_ref()
    }

    /// Reads the persisted snapshot and makes it current.
    pub fn load(
        &mut self,
        kv: &dyn KeyValueStore,
    ) -> Result<Option<UserProfile>, PersistenceError> {
        let Some(raw) = kv.get(&self.key)? else {
            debug!(key = %self.key, "no saved user");
            self.current = None;
            return Ok(None);
        };
        let profile: UserProfile = serde_json::from_slice(&raw)?;
        info!(user = %profile.id(), xp = profile.total_xp(), "loaded user");
        self.current = Some(profile.clone());
        Ok(Some(profile))
    }

    /// Writes the profile, then makes it current. A failed write leaves the
    /// previous profile in place.
    pub fn save(
        &mut self,
        kv: &mut dyn KeyValueStore,
        profile: UserProfile,
    ) -> Result<(), PersistenceError> {
        let bytes = Self::encode(&profile)?;
        if let Err(err) = kv.set(&self.key, &bytes) {
            warn!(user = %profile.id(), error = %err, "user snapshot not saved");
            return Err(err);
        }
        self.accept(profile);
        Ok(())
    }

    /// Fresh zero-state profile with a new id and simulated wallet.
    pub fn connect() -> UserProfile {
        let id = UserId(format!("user_{}", Uuid::new_v4().simple()));
        let wallet = format!(
            "0x{}{}",
            Uuid::new_v4().simple(),
            &Uuid::new_v4().simple().to_string()[..8]
        );
        UserProfile::new(id, Some(wallet))
    }

    pub fn verify_identity(profile: &UserProfile) -> UserProfile {
        account::verify_identity(profile)
    }

    pub(crate) fn encode(profile: &UserProfile) -> Result<Vec<u8>, PersistenceError> {
        Ok(serde_json::to_vec(profile)?)
    }

    pub(crate) fn accept(&mut self, profile: UserProfile) {
        self.current = Some(profile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryKvStore;

    #[test]
    fn connect_creates_zero_state_profiles_with_distinct_ids() {
        let a = ProgressStore::connect();
        let b = ProgressStore::connect();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.total_xp(), 0);
        assert_eq!(a.level(), 1);
        assert!(!a.identity_verified());
        assert!(a.credentials().is_empty());
        assert_eq!(a.wallet_address().map(str::len), Some(42));
    }

    #[test]
    fn save_then_load_round_trips_through_the_store() {
        let mut kv = MemoryKvStore::new();
        let mut store = ProgressStore::default();
        let profile = ProgressStore::connect();
        store.save(&mut kv, profile.clone()).expect("save");

        let mut reloaded = ProgressStore::default();
        assert_eq!(reloaded.load(&kv).expect("load"), Some(profile));
    }

    #[test]
    fn failed_save_keeps_previous_profile() {
        let mut kv = MemoryKvStore::new();
        let mut store = ProgressStore::default();
        let original = ProgressStore::connect();
        store.save(&mut kv, original.clone()).expect("save");

        kv.set_reject_writes(true);
        let verified = ProgressStore::verify_identity(&original);
        assert!(store.save(&mut kv, verified).is_err());
        assert_eq!(store.current(), Some(&original));

        let mut reloaded = ProgressStore::default();
        assert_eq!(reloaded.load(&kv).expect("load"), Some(original));
    }

    #[test]
    fn verify_identity_twice_is_identical() {
        let profile = ProgressStore::connect();
        let once = ProgressStore::verify_identity(&profile);
        let twice = ProgressStore::verify_identity(&once);
        assert!(once.is_creator());
        assert_eq!(once, twice);
    }
}

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::{PrizeKind, QuestId};

pub const XP_PER_LEVEL: u64 = 100;

/// `floor(total_xp / 100) + 1`. Levels are never stored.
pub fn level_for_xp(total_xp: u64) -> u64 {
    total_xp / XP_PER_LEVEL + 1
}

/// XP needed to reach the level after the one `total_xp` sits in.
pub fn next_level_threshold(total_xp: u64) -> u64 {
    level_for_xp(total_xp) * XP_PER_LEVEL
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialId(pub String);

impl CredentialId {
    pub fn for_prize(quest_id: &QuestId) -> Self {
        Self(format!("prize_{}_{}", quest_id, Uuid::new_v4().simple()))
    }

    pub fn for_completion(quest_id: &QuestId) -> Self {
        Self(format!("credential_{}_{}", quest_id, Uuid::new_v4().simple()))
    }
}

impl fmt::Display for CredentialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialKind {
    Completion,
    Prize(PrizeKind),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub id: CredentialId,
    pub quest_id: QuestId,
    pub kind: CredentialKind,
    pub issued_at: DateTime<Utc>,
}

/// One user's progress. Fields are private so that XP, completions and
/// credentials can only move through the progression rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    id: UserId,
    #[serde(default)]
    wallet_address: Option<String>,
    #[serde(default)]
    identity_verified: bool,
    #[serde(default)]
    total_xp: u64,
    #[serde(default)]
    completed_quest_ids: BTreeSet<QuestId>,
    #[serde(default)]
    credentials: Vec<Credential>,
    #[serde(default)]
    created_quest_ids: Vec<QuestId>,
    #[serde(default)]
    reputation: u64,
}

impl UserProfile {
    pub fn new(id: UserId, wallet_address: Option<String>) -> Self {
        Self {
            id,
            wallet_address,
            identity_verified: false,
            total_xp: 0,
            completed_quest_ids: BTreeSet::new(),
            credentials: Vec::new(),
            created_quest_ids: Vec::new(),
            reputation: 0,
        }
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn wallet_address(&self) -> Option<&str> {
        self.wallet_address.as_deref()
    }

    /// `0x1234...5678`, or `Anonymous` without a wallet.
    pub fn display_name(&self) -> String {
        match self.wallet_address.as_deref() {
            Some(address) if address.is_ascii() && address.len() > 10 => format!(
                "{}...{}",
                &address[..6],
                &address[address.len() - 4..]
            ),
            Some(address) if !address.is_empty() => address.to_string(),
            _ => "Anonymous".to_string(),
        }
    }

    pub fn identity_verified(&self) -> bool {
        self.identity_verified
    }

    pub fn is_creator(&self) -> bool {
        self.identity_verified
    }

    pub fn total_xp(&self) -> u64 {
        self.total_xp
    }

    pub fn level(&self) -> u64 {
        level_for_xp(self.total_xp)
    }

    pub fn completed_quest_ids(&self) -> &BTreeSet<QuestId> {
        &self.completed_quest_ids
    }

    pub fn has_completed(&self, quest_id: &QuestId) -> bool {
        self.completed_quest_ids.contains(quest_id)
    }

    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }

    pub fn credential_ids(&self) -> impl Iterator<Item = &CredentialId> + '_ {
        self.credentials.iter().map(|credential| &credential.id)
    }

    pub fn has_credential(&self, quest_id: &QuestId, kind: CredentialKind) -> bool {
        self.credentials
            .iter()
            .any(|credential| credential.quest_id == *quest_id && credential.kind == kind)
    }

    pub fn created_quest_ids(&self) -> &[QuestId] {
        &self.created_quest_ids
    }

    pub fn reputation(&self) -> u64 {
        self.reputation
    }

    /// Returns false when the flag was already set.
    pub(crate) fn mark_verified(&mut self) -> bool {
        if self.identity_verified {
            return false;
        }
        self.identity_verified = true;
        true
    }

    /// Adds the quest and its XP together, or nothing if it was already there.
    pub(crate) fn award_completion(&mut self, quest_id: &QuestId, xp: u32) -> bool {
        if !self.completed_quest_ids.insert(quest_id.clone()) {
            return false;
        }
        self.total_xp = self.total_xp.saturating_add(u64::from(xp));
        true
    }

    pub(crate) fn push_credential(&mut self, credential: Credential) {
        self.credentials.push(credential);
    }

    pub(crate) fn record_created_quest(&mut self, quest_id: QuestId, reputation_bonus: u64) {
        self.created_quest_ids.push(quest_id);
        self.reputation = self.reputation.saturating_add(reputation_bonus);
    }
}

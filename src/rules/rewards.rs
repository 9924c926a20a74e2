use std::str::FromStr;

use bevy_ecs::prelude::*;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::content::QuestDefinition;
use crate::error::{ClaimRejection, QuestError};
use crate::progress::{Credential, CredentialId, CredentialKind, UserProfile};

/// Whether a quest's prize or completion credential may be issued more than once.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimPolicy {
    #[default]
    Once,
    Repeatable,
}

impl FromStr for ClaimPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "once" => Ok(ClaimPolicy::Once),
            "repeatable" => Ok(ClaimPolicy::Repeatable),
            other => Err(format!("unknown claim policy {}", other)),
        }
    }
}

fn issue(
    profile: &UserProfile,
    quest: &QuestDefinition,
    kind: CredentialKind,
    policy: ClaimPolicy,
    id: CredentialId,
) -> Result<(UserProfile, CredentialId), QuestError> {
    if !profile.has_completed(&quest.id) {
        return Err(QuestError::invalid_claim(&quest.id, ClaimRejection::NotCompleted));
    }
    if policy == ClaimPolicy::Once && profile.has_credential(&quest.id, kind) {
        return Err(QuestError::invalid_claim(&quest.id, ClaimRejection::AlreadyClaimed));
    }

    let mut updated = profile.clone();
    updated.push_credential(Credential {
        id: id.clone(),
        quest_id: quest.id.clone(),
        kind,
        issued_at: Utc::now(),
    });
    info!(quest = %quest.id, user = %profile.id(), credential = %id, ?kind, "credential issued");
    Ok((updated, id))
}

/// Issues the quest's prize to a user who has completed it.
pub fn claim_prize(
    profile: &UserProfile,
    quest: &QuestDefinition,
    policy: ClaimPolicy,
) -> Result<(UserProfile, CredentialId), QuestError> {
    let Some(prize) = &quest.prize else {
        return Err(QuestError::invalid_claim(&quest.id, ClaimRejection::NoPrize));
    };
    issue(
        profile,
        quest,
        CredentialKind::Prize(prize.kind()),
        policy,
        CredentialId::for_prize(&quest.id),
    )
}

/// Issues a proof-of-completion credential, prize or not.
pub fn mint_credential(
    profile: &UserProfile,
    quest: &QuestDefinition,
    policy: ClaimPolicy,
) -> Result<(UserProfile, CredentialId), QuestError> {
    issue(
        profile,
        quest,
        CredentialKind::Completion,
        policy,
        CredentialId::for_completion(&quest.id),
    )
}

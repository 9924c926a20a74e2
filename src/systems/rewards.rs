use bevy_ecs::prelude::*;

use crate::catalog::QuestCatalog;
use crate::core::staging::{IntentOutcome, StagedChanges};
use crate::core::world::{ActiveIntent, QuestIntent};
use crate::progress::ProgressStore;
use crate::rules::{claim_prize, mint_credential, ClaimPolicy};
use crate::systems::{lookup_quest, working_profile, ProgressEventLog};

/// System: prize claims and completion credentials.
pub fn reward_system(
    intent: Res<ActiveIntent>,
    store: Res<ProgressStore>,
    catalog: Res<QuestCatalog>,
    policy: Res<ClaimPolicy>,
    mut staged: ResMut<StagedChanges>,
    mut log: ResMut<ProgressEventLog>,
) {
    let (quest_id, is_prize) = match intent.0.as_ref() {
        Some(QuestIntent::ClaimPrize { quest_id }) => (quest_id, true),
        Some(QuestIntent::MintCredential { quest_id }) => (quest_id, false),
        _ => return,
    };

    let issued = working_profile(&store, &staged).and_then(|profile| {
        let quest = lookup_quest(&catalog, quest_id)?;
        if is_prize {
            claim_prize(&profile, quest, *policy)
        } else {
            mint_credential(&profile, quest, *policy)
        }
    });

    let (profile, credential_id) = match issued {
        Ok(issued) => issued,
        Err(err) => return staged.fail(err),
    };

    if is_prize {
        log.0.push(format!("Prize claimed: {}.", credential_id));
        staged.outcome = Some(IntentOutcome::PrizeClaimed {
            quest_id: quest_id.clone(),
            credential_id,
        });
    } else {
        log.0.push(format!("Credential minted: {}.", credential_id));
        staged.outcome = Some(IntentOutcome::CredentialMinted {
            quest_id: quest_id.clone(),
            credential_id,
        });
    }
    staged.profile = Some(profile);
}

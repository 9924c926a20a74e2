use bevy_ecs::prelude::*;

use crate::core::staging::{IntentOutcome, StagedChanges};
use crate::core::world::{ActiveIntent, QuestIntent};
use crate::progress::ProgressStore;
use crate::rules::verify_identity;
use crate::systems::{working_profile, ProgressEventLog};

/// System: simulated wallet connection and identity verification.
pub fn account_system(
    intent: Res<ActiveIntent>,
    store: Res<ProgressStore>,
    mut staged: ResMut<StagedChanges>,
    mut log: ResMut<ProgressEventLog>,
) {
    match intent.0.as_ref() {
        Some(QuestIntent::Connect) => {
            if let Some(profile) = store.current() {
                log.0.push(format!("Already connected as {}.", profile.id()));
                staged.outcome = Some(IntentOutcome::AlreadyConnected);
                return;
            }
            let profile = ProgressStore::connect();
            log.0.push(format!(
                "Connected {} with wallet {}.",
                profile.id(),
                profile.display_name()
            ));
            staged.outcome = Some(IntentOutcome::Connected {
                user_id: profile.id().clone(),
            });
            staged.profile = Some(profile);
        }
        Some(QuestIntent::VerifyIdentity) => {
            let profile = match working_profile(&store, &staged) {
                Ok(profile) => profile,
                Err(err) => return staged.fail(err),
            };
            if profile.identity_verified() {
                log.0.push("Identity already verified.".to_string());
                staged.outcome = Some(IntentOutcome::AlreadyVerified);
                return;
            }
            log.0.push("Identity verified; quest creation unlocked.".to_string());
            staged.profile = Some(verify_identity(&profile));
            staged.outcome = Some(IntentOutcome::IdentityVerified);
        }
        _ => {}
    }
}

use bevy_ecs::prelude::*;
use chrono::Utc;

use crate::catalog::QuestCatalog;
use crate::core::staging::{IntentOutcome, StagedChanges};
use crate::core::world::{ActiveIntent, QuestIntent};
use crate::progress::ProgressStore;
use crate::rules::{create_quest, publish_quest};
use crate::systems::{lookup_quest, working_profile, ProgressEventLog};

/// System: quest creation and publishing by verified creators.
pub fn authoring_system(
    intent: Res<ActiveIntent>,
    store: Res<ProgressStore>,
    catalog: Res<QuestCatalog>,
    mut staged: ResMut<StagedChanges>,
    mut log: ResMut<ProgressEventLog>,
) {
    match intent.0.as_ref() {
        Some(QuestIntent::CreateQuest { draft }) => {
            let created = working_profile(&store, &staged)
                .and_then(|profile| create_quest(&profile, draft.clone(), &catalog, Utc::now()));
            let (profile, quest) = match created {
                Ok(created) => created,
                Err(err) => return staged.fail(err),
            };
            log.0.push(format!(
                "Created \"{}\" as {} (reputation {}).",
                quest.title,
                quest.id,
                profile.reputation()
            ));
            staged.outcome = Some(IntentOutcome::QuestCreated {
                quest_id: quest.id.clone(),
            });
            staged.quests.push(quest);
            staged.profile = Some(profile);
        }
        Some(QuestIntent::PublishQuest { quest_id }) => {
            let published = working_profile(&store, &staged).and_then(|profile| {
                let quest = lookup_quest(&catalog, quest_id)?;
                publish_quest(&profile, quest)
            });
            match published {
                Ok(Some(quest)) => {
                    log.0.push(format!("Published \"{}\".", quest.title));
                    staged.outcome = Some(IntentOutcome::QuestPublished {
                        quest_id: quest_id.clone(),
                    });
                    staged.quests.push(quest);
                }
                Ok(None) => {
                    log.0.push(format!("Quest {} is already published.", quest_id));
                    staged.outcome = Some(IntentOutcome::AlreadyPublished {
                        quest_id: quest_id.clone(),
                    });
                }
                Err(err) => staged.fail(err),
            }
        }
        _ => {}
    }
}

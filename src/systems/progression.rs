use bevy_ecs::prelude::*;
use tracing::debug;

use crate::catalog::QuestCatalog;
use crate::content::QuestId;
use crate::core::staging::{IntentOutcome, SessionBook, SessionChange, StagedChanges};
use crate::core::world::{ActiveIntent, QuestIntent};
use crate::error::{Lookup, QuestError};
use crate::progress::ProgressStore;
use crate::rules::{advance, submit_answer, AnswerOutcome, Completion, QuestSession, StepOutcome};
use crate::systems::{lookup_quest, working_profile, ProgressEventLog};

/// System: opens and closes quest views.
pub fn session_intake_system(
    intent: Res<ActiveIntent>,
    store: Res<ProgressStore>,
    catalog: Res<QuestCatalog>,
    sessions: Res<SessionBook>,
    mut staged: ResMut<StagedChanges>,
    mut log: ResMut<ProgressEventLog>,
) {
    match intent.0.as_ref() {
        Some(QuestIntent::OpenQuest { quest_id }) => {
            let profile = match working_profile(&store, &staged) {
                Ok(profile) => profile,
                Err(err) => return staged.fail(err),
            };
            let quest = match lookup_quest(&catalog, quest_id) {
                Ok(quest) => quest,
                Err(err) => return staged.fail(err),
            };
            let already_completed = profile.has_completed(quest_id);
            log.0.push(format!(
                "Opened \"{}\" at step 1/{}.",
                quest.title,
                quest.steps.len()
            ));
            staged
                .sessions
                .push(SessionChange::Put(QuestSession::open(quest_id.clone())));
            staged.outcome = Some(IntentOutcome::SessionOpened {
                quest_id: quest_id.clone(),
                already_completed,
            });
        }
        Some(QuestIntent::CloseQuest { quest_id }) => {
            if sessions.get(quest_id).is_none() {
                return staged.fail(QuestError::NotFound(Lookup::Session(quest_id.clone())));
            }
            log.0.push(format!("Closed quest {}.", quest_id));
            staged.sessions.push(SessionChange::Remove(quest_id.clone()));
            staged.outcome = Some(IntentOutcome::SessionClosed {
                quest_id: quest_id.clone(),
            });
        }
        _ => {}
    }
}

/// System: step acknowledgements and quiz answers.
pub fn step_system(
    intent: Res<ActiveIntent>,
    store: Res<ProgressStore>,
    catalog: Res<QuestCatalog>,
    sessions: Res<SessionBook>,
    mut staged: ResMut<StagedChanges>,
    mut log: ResMut<ProgressEventLog>,
) {
    let (quest_id, answer) = match intent.0.as_ref() {
        Some(QuestIntent::Advance { quest_id }) => (quest_id, None),
        Some(QuestIntent::SubmitAnswer { quest_id, selected }) => (quest_id, Some(*selected)),
        _ => return,
    };

    let result = run_step(&store, &staged, &catalog, &sessions, quest_id, answer);

    match result {
        Err(err) => staged.fail(err),
        Ok(None) => {
            debug!(quest = %quest_id, "incorrect answer");
            log.0.push("Incorrect answer.".to_string());
            staged.outcome = Some(IntentOutcome::AnswerIncorrect {
                quest_id: quest_id.clone(),
            });
        }
        Ok(Some(outcome)) => stage_step(quest_id, outcome, &mut staged, &mut log),
    }
}

fn run_step(
    store: &ProgressStore,
    staged: &StagedChanges,
    catalog: &QuestCatalog,
    sessions: &SessionBook,
    quest_id: &QuestId,
    answer: Option<usize>,
) -> Result<Option<StepOutcome>, QuestError> {
    let profile = working_profile(store, staged)?;
    let quest = lookup_quest(catalog, quest_id)?;
    let session = sessions
        .get(quest_id)
        .ok_or_else(|| QuestError::NotFound(Lookup::Session(quest_id.clone())))?;
    match answer {
        None => advance(session, quest, &profile).map(Some),
        Some(selected) => match submit_answer(session, quest, &profile, selected)? {
            AnswerOutcome::Incorrect => Ok(None),
            AnswerOutcome::Accepted(outcome) => Ok(Some(outcome)),
        },
    }
}

fn stage_step(
    quest_id: &QuestId,
    outcome: StepOutcome,
    staged: &mut StagedChanges,
    log: &mut ProgressEventLog,
) {
    match outcome {
        StepOutcome::Advanced { session } => {
            let step_index = session.step_index().unwrap_or_default();
            log.0.push(format!("Moved to step {}.", step_index + 1));
            staged.sessions.push(SessionChange::Put(session));
            staged.outcome = Some(IntentOutcome::StepAdvanced {
                quest_id: quest_id.clone(),
                step_index,
            });
        }
        StepOutcome::Completed {
            session,
            completion,
        } => {
            staged.sessions.push(SessionChange::Put(session));
            match completion {
                Completion::Recorded {
                    profile,
                    xp_awarded,
                } => {
                    log.0.push(format!(
                        "Quest completed: +{} XP (level {}).",
                        xp_awarded,
                        profile.level()
                    ));
                    staged.outcome = Some(IntentOutcome::QuestCompleted {
                        quest_id: quest_id.clone(),
                        xp_awarded,
                        level: profile.level(),
                    });
                    staged.completions.push(quest_id.clone());
                    staged.profile = Some(profile);
                }
                Completion::AlreadyCompleted => {
                    log.0.push("Quest finished again; no new rewards.".to_string());
                    staged.outcome = Some(IntentOutcome::QuestReplayed {
                        quest_id: quest_id.clone(),
                    });
                }
            }
        }
    }
}

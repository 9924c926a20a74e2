use std::collections::HashMap;

use bevy_ecs::prelude::*;

use crate::content::{QuestDefinition, QuestId};
use crate::error::QuestError;
use crate::progress::{CredentialId, UserId, UserProfile};
use crate::rules::QuestSession;

/// Open quest views, keyed by quest. Never persisted.
#[derive(Resource, Debug, Default, Clone)]
pub struct SessionBook(pub HashMap<QuestId, QuestSession>);

impl SessionBook {
    pub fn get(&self, quest_id: &QuestId) -> Option<&QuestSession> {
        self.0.get(quest_id)
    }

    fn apply(&mut self, change: SessionChange) {
        match change {
            SessionChange::Put(session) => {
                self.0.insert(session.quest_id().clone(), session);
            }
            SessionChange::Remove(quest_id) => {
                self.0.remove(&quest_id);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionChange {
    Put(QuestSession),
    Remove(QuestId),
}

/// What a dispatched intent did, as reported back to the view layer.
#[derive(Debug, Clone, PartialEq)]
pub enum IntentOutcome {
    Connected { user_id: UserId },
    AlreadyConnected,
    IdentityVerified,
    AlreadyVerified,
    SessionOpened { quest_id: QuestId, already_completed: bool },
    SessionClosed { quest_id: QuestId },
    StepAdvanced { quest_id: QuestId, step_index: usize },
    AnswerIncorrect { quest_id: QuestId },
    QuestCompleted { quest_id: QuestId, xp_awarded: u32, level: u64 },
    QuestReplayed { quest_id: QuestId },
    PrizeClaimed { quest_id: QuestId, credential_id: CredentialId },
    CredentialMinted { quest_id: QuestId, credential_id: CredentialId },
    QuestCreated { quest_id: QuestId },
    QuestPublished { quest_id: QuestId },
    AlreadyPublished { quest_id: QuestId },
}

/// Everything the systems decided for one intent. Nothing in here is visible
/// to the rest of the app until it has been persisted.
#[derive(Resource, Debug, Default)]
pub struct StagedChanges {
    pub profile: Option<UserProfile>,
    pub sessions: Vec<SessionChange>,
    pub completions: Vec<QuestId>,
    pub quests: Vec<QuestDefinition>,
    pub outcome: Option<IntentOutcome>,
    pub error: Option<QuestError>,
}

impl StagedChanges {
    pub fn fail(&mut self, err: QuestError) {
        self.error = Some(err);
    }

    pub fn touches_catalog(&self) -> bool {
        !self.completions.is_empty() || !self.quests.is_empty()
    }

    pub(crate) fn apply_sessions(&mut self, book: &mut SessionBook) {
        for change in self.sessions.drain(..) {
            book.apply(change);
        }
    }
}

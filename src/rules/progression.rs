use tracing::{debug, info};

use crate::content::{QuestDefinition, Step};
use crate::error::QuestError;
use crate::progress::UserProfile;
use crate::rules::session::{QuestSession, SessionState};

/// Result of recording a completed quest against a profile.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    /// First completion. Carries the updated profile; the caller owes the
    /// catalog one completion.
    Recorded { profile: UserProfile, xp_awarded: u32 },
    /// The quest was already in the profile; nothing changed.
    AlreadyCompleted,
}

impl Completion {
    pub fn increments_counter(&self) -> bool {
        matches!(self, Completion::Recorded { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Advanced {
        session: QuestSession,
    },
    Completed {
        session: QuestSession,
        completion: Completion,
    },
}

impl StepOutcome {
    pub fn session(&self) -> &QuestSession {
        match self {
            StepOutcome::Advanced { session } | StepOutcome::Completed { session, .. } => session,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnswerOutcome {
    /// Wrong option. Session and profile stay as they were.
    Incorrect,
    Accepted(StepOutcome),
}

fn current_step<'q>(
    session: &QuestSession,
    quest: &'q QuestDefinition,
) -> Result<(usize, &'q Step), QuestError> {
    if session.quest_id() != &quest.id {
        return Err(QuestError::InvalidStep(format!(
            "session for {} used with quest {}",
            session.quest_id(),
            quest.id
        )));
    }
    let SessionState::InProgress(index) = session.state() else {
        return Err(QuestError::InvalidStep(format!(
            "quest {} is already completed in this session",
            quest.id
        )));
    };
    let step = quest.step(index).ok_or_else(|| {
        QuestError::InvalidStep(format!(
            "step {} is out of range for quest {} with {} steps",
            index,
            quest.id,
            quest.steps.len()
        ))
    })?;
    Ok((index, step))
}

fn step_forward(
    session: &QuestSession,
    index: usize,
    quest: &QuestDefinition,
    profile: &UserProfile,
) -> StepOutcome {
    if quest.is_last_step(index) {
        let completion = record_completion(profile, quest);
        StepOutcome::Completed {
            session: session.with_state(SessionState::Completed),
            completion,
        }
    } else {
        debug!(quest = %quest.id, step = index + 1, "advanced to next step");
        StepOutcome::Advanced {
            session: session.with_state(SessionState::InProgress(index + 1)),
        }
    }
}

/// Acknowledges a learn or action step.
pub fn advance(
    session: &QuestSession,
    quest: &QuestDefinition,
    profile: &UserProfile,
) -> Result<StepOutcome, QuestError> {
    let (index, step) = current_step(session, quest)?;
    if step.is_quiz() {
        return Err(QuestError::InvalidStep(format!(
            "step {} of quest {} is a quiz and needs an answer",
            index + 1,
            quest.id
        )));
    }
    Ok(step_forward(session, index, quest, profile))
}

/// Grades a quiz answer. Only the correct option moves the session on.
pub fn submit_answer(
    session: &QuestSession,
    quest: &QuestDefinition,
    profile: &UserProfile,
    selected: usize,
) -> Result<AnswerOutcome, QuestError> {
    let (index, step) = current_step(session, quest)?;
    let Step::Quiz { correct, .. } = step else {
        return Err(QuestError::InvalidStep(format!(
            "step {} of quest {} is not a quiz",
            index + 1,
            quest.id
        )));
    };
    if selected != *correct {
        return Ok(AnswerOutcome::Incorrect);
    }
    Ok(AnswerOutcome::Accepted(step_forward(
        session, index, quest, profile,
    )))
}

pub fn record_completion(profile: &UserProfile, quest: &QuestDefinition) -> Completion {
    let mut updated = profile.clone();
    if !updated.award_completion(&quest.id, quest.xp) {
        debug!(quest = %quest.id, user = %profile.id(), "quest already completed");
        return Completion::AlreadyCompleted;
    }
    info!(
        quest = %quest.id,
        user = %updated.id(),
        xp = quest.xp,
        total_xp = updated.total_xp(),
        level = updated.level(),
        "quest completed"
    );
    Completion::Recorded {
        profile: updated,
        xp_awarded: quest.xp,
    }
}

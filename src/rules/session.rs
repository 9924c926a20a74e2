use crate::content::QuestId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    InProgress(usize),
    Completed,
}

/// Position of one open quest view. Lives only as long as the view does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestSession {
    quest_id: QuestId,
    state: SessionState,
}

impl QuestSession {
    pub fn open(quest_id: QuestId) -> Self {
        Self {
            quest_id,
            state: SessionState::InProgress(0),
        }
    }

    pub fn quest_id(&self) -> &QuestId {
        &self.quest_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn step_index(&self) -> Option<usize> {
        match self.state {
            SessionState::InProgress(index) => Some(index),
            SessionState::Completed => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    pub fn progress_percent(&self, total_steps: usize) -> u8 {
        match self.state {
            SessionState::Completed => 100,
            SessionState::InProgress(_) if total_steps == 0 => 0,
            SessionState::InProgress(index) => {
                let percent = ((index + 1) as f64 / total_steps as f64 * 100.0).round();
                percent.min(100.0) as u8
            }
        }
    }

    pub(crate) fn with_state(&self, state: SessionState) -> Self {
        Self {
            quest_id: self.quest_id.clone(),
            state,
        }
    }
}

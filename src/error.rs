use std::fmt;

use thiserror::Error;

use crate::content::QuestId;

/// Failures of the durable key-value store or of the snapshot codec.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("snapshot codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("write rejected for key {key}: {reason}")]
    WriteRejected { key: String, reason: String },

    #[error("{0}")]
    InvalidData(String),
}

/// What a failed lookup was looking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Quest(QuestId),
    User,
    Session(QuestId),
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Quest(id) => write!(f, "quest {}", id),
            Lookup::User => write!(f, "connected user"),
            Lookup::Session(id) => write!(f, "open session for quest {}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimRejection {
    NotCompleted,
    NoPrize,
    AlreadyClaimed,
}

impl fmt::Display for ClaimRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimRejection::NotCompleted => write!(f, "quest not completed"),
            ClaimRejection::NoPrize => write!(f, "quest has no prize"),
            ClaimRejection::AlreadyClaimed => write!(f, "already claimed"),
        }
    }
}

#[derive(Debug, Error)]
pub enum QuestError {
    #[error("invalid claim for quest {quest_id}: {reason}")]
    InvalidClaim {
        quest_id: QuestId,
        reason: ClaimRejection,
    },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("{0} not found")]
    NotFound(Lookup),

    #[error("invalid step: {0}")]
    InvalidStep(String),

    #[error("user is not a verified creator")]
    NotCreator,

    #[error("invalid quest: {0}")]
    Validation(String),
}

impl QuestError {
    pub fn invalid_claim(quest_id: &QuestId, reason: ClaimRejection) -> Self {
        QuestError::InvalidClaim {
            quest_id: quest_id.clone(),
            reason,
        }
    }
}

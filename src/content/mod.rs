pub mod quest;

pub use quest::{
    validate_unique_ids, ActionKind, Difficulty, Prize, PrizeKind, QuestDefinition, QuestDraft,
    QuestId, Step,
};

pub mod seed_quests;

pub use seed_quests::{seed_quests, SYSTEM_CREATOR_ID, SYSTEM_CREATOR_NAME};

pub mod account;
pub mod authoring;
pub mod progression;
pub mod rewards;
pub mod session;

pub use account::verify_identity;
pub use authoring::{create_quest, publish_quest, CREATION_REPUTATION};
pub use progression::{
    advance, record_completion, submit_answer, AnswerOutcome, Completion, StepOutcome,
};
pub use rewards::{claim_prize, mint_credential, ClaimPolicy};
pub use session::{QuestSession, SessionState};

pub mod profile;
pub mod store;
pub mod summary;

pub use profile::{
    level_for_xp, next_level_threshold, Credential, CredentialId, CredentialKind, UserId,
    UserProfile, XP_PER_LEVEL,
};
pub use store::ProgressStore;
pub use summary::{category_progress, profile_overview, CategoryProgress, ProfileOverview};

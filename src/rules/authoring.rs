use chrono::{DateTime, Utc};
use tracing::info;

use crate::catalog::QuestCatalog;
use crate::content::{QuestDefinition, QuestDraft};
use crate::error::QuestError;
use crate::progress::UserProfile;

pub const CREATION_REPUTATION: u64 = 10;

/// Turns a draft into a catalog-ready quest owned by `profile`.
pub fn create_quest(
    profile: &UserProfile,
    draft: QuestDraft,
    catalog: &QuestCatalog,
    now: DateTime<Utc>,
) -> Result<(UserProfile, QuestDefinition), QuestError> {
    if !profile.is_creator() {
        return Err(QuestError::NotCreator);
    }

    let quest = QuestDefinition {
        id: catalog.next_quest_id(now),
        title: draft.title,
        description: draft.description,
        category: draft.category,
        creator_id: profile.id().0.clone(),
        creator_name: profile.display_name(),
        xp: draft.xp,
        duration: draft.duration,
        difficulty: draft.difficulty,
        steps: draft.steps,
        prize: draft.prize,
        is_published: draft.is_published,
        created_at: now,
    };
    quest.validate()?;

    let mut updated = profile.clone();
    updated.record_created_quest(quest.id.clone(), CREATION_REPUTATION);
    info!(
        quest = %quest.id,
        user = %updated.id(),
        reputation = updated.reputation(),
        "quest created"
    );
    Ok((updated, quest))
}

/// Marks a quest published. `None` when it already was.
pub fn publish_quest(
    profile: &UserProfile,
    quest: &QuestDefinition,
) -> Result<Option<QuestDefinition>, QuestError> {
    if quest.creator_id != profile.id().0 {
        return Err(QuestError::NotCreator);
    }
    if quest.is_published {
        return Ok(None);
    }
    let mut published = quest.clone();
    published.is_published = true;
    info!(quest = %quest.id, "quest published");
    Ok(Some(published))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Difficulty, QuestId, Step};
    use crate::progress::UserId;
    use crate::rules::verify_identity;

    fn draft() -> QuestDraft {
        QuestDraft {
            title: "DAO Voting".to_string(),
            description: "How on-chain governance works".to_string(),
            category: "DAOs".to_string(),
            xp: 60,
            duration: "6 min".to_string(),
            difficulty: Difficulty::Intermediate,
            steps: vec![Step::Learn {
                title: "Proposals".to_string(),
                content: "Anyone holding tokens can propose.".to_string(),
            }],
            prize: None,
            is_published: false,
        }
    }

    fn creator() -> UserProfile {
        verify_identity(&UserProfile::new(
            UserId("user_7".to_string()),
            Some("0xabcdef0123456789".to_string()),
        ))
    }

    #[test]
    fn unverified_users_cannot_create() {
        let profile = UserProfile::new(UserId("user_7".to_string()), None);
        let result = create_quest(&profile, draft(), &QuestCatalog::seeded(), Utc::now());
        assert!(matches!(result, Err(QuestError::NotCreator)));
    }

    #[test]
    fn creation_fills_identity_and_rewards_reputation() {
        let now = DateTime::from_timestamp_millis(1_710_000_000_000).expect("timestamp");
        let (profile, quest) =
            create_quest(&creator(), draft(), &QuestCatalog::seeded(), now).expect("create");
        assert_eq!(quest.id, QuestId::from("quest_1710000000000"));
        assert_eq!(quest.creator_id, "user_7");
        assert_eq!(quest.creator_name, "0xabcd...6789");
        assert_eq!(quest.created_at, now);
        assert_eq!(profile.reputation(), CREATION_REPUTATION);
        assert_eq!(profile.created_quest_ids(), &[quest.id.clone()]);
    }

    #[test]
    fn invalid_drafts_do_not_change_reputation() {
        let mut bad = draft();
        bad.steps.clear();
        let profile = creator();
        assert!(matches!(
            create_quest(&profile, bad, &QuestCatalog::seeded(), Utc::now()),
            Err(QuestError::Validation(_))
        ));
        assert_eq!(profile.reputation(), 0);
    }

    #[test]
    fn only_the_creator_publishes_and_only_once() {
        let (profile, quest) =
            create_quest(&creator(), draft(), &QuestCatalog::seeded(), Utc::now()).expect("create");
        let published = publish_quest(&profile, &quest)
            .expect("publish")
            .expect("was a draft");
        assert!(published.is_published);
        assert_eq!(publish_quest(&profile, &published).expect("again"), None);

        let stranger = verify_identity(&UserProfile::new(UserId("user_8".to_string()), None));
        assert!(matches!(
            publish_quest(&stranger, &quest),
            Err(QuestError::NotCreator)
        ));
    }
}

use std::collections::BTreeMap;

use crate::catalog::QuestCatalog;
use crate::progress::profile::{next_level_threshold, UserProfile, XP_PER_LEVEL};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryProgress {
    pub category: String,
    pub completed: usize,
    pub total: usize,
    pub earned_xp: u64,
    pub total_xp: u64,
}

impl CategoryProgress {
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        (self.completed as f64 / self.total as f64 * 100.0).round() as u8
    }
}

/// Progress per category over published quests, sorted by category name.
pub fn category_progress(catalog: &QuestCatalog, profile: Option<&UserProfile>) -> Vec<CategoryProgress> {
    let mut by_category: BTreeMap<&str, CategoryProgress> = BTreeMap::new();
    for record in catalog.published() {
        let quest = &record.definition;
        let entry = by_category
            .entry(quest.category.as_str())
            .or_insert_with(|| CategoryProgress {
                category: quest.category.clone(),
                completed: 0,
                total: 0,
                earned_xp: 0,
                total_xp: 0,
            });
        entry.total += 1;
        entry.total_xp += u64::from(quest.xp);
        if profile.is_some_and(|profile| profile.has_completed(&quest.id)) {
            entry.completed += 1;
            entry.earned_xp += u64::from(quest.xp);
        }
    }
    by_category.into_values().collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileOverview {
    pub level: u64,
    pub total_xp: u64,
    pub xp_into_level: u64,
    pub next_level_at: u64,
    pub completed_quests: usize,
    pub credentials: usize,
    pub reputation: u64,
    pub is_creator: bool,
}

pub fn profile_overview(profile: &UserProfile) -> ProfileOverview {
    ProfileOverview {
        level: profile.level(),
        total_xp: profile.total_xp(),
        xp_into_level: profile.total_xp() % XP_PER_LEVEL,
        next_level_at: next_level_threshold(profile.total_xp()),
        completed_quests: profile.completed_quest_ids().len(),
        credentials: profile.credentials().len(),
        reputation: profile.reputation(),
        is_creator: profile.is_creator(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::QuestId;
    use crate::progress::UserId;

    #[test]
    fn categories_report_earned_xp() {
        let catalog = QuestCatalog::seeded();
        let mut profile = UserProfile::new(UserId("user_1".to_string()), None);
        profile.award_completion(&QuestId::from("wallet-security"), 75);

        let progress = category_progress(&catalog, Some(&profile));
        assert_eq!(progress.len(), 2);
        let security = progress
            .iter()
            .find(|entry| entry.category == "Security")
            .expect("security category");
        assert_eq!(security.completed, 1);
        assert_eq!(security.earned_xp, 75);
        assert_eq!(security.percent(), 100);

        let defi = &progress[0];
        assert_eq!(defi.category, "DeFi Fundamentals");
        assert_eq!((defi.completed, defi.total_xp), (0, 50));
    }

    #[test]
    fn anonymous_progress_is_empty() {
        let progress = category_progress(&QuestCatalog::seeded(), None);
        assert!(progress.iter().all(|entry| entry.completed == 0));
    }

    #[test]
    fn overview_splits_level_progress() {
        let mut profile = UserProfile::new(UserId("user_1".to_string()), None);
        profile.award_completion(&QuestId::from("a"), 130);
        let overview = profile_overview(&profile);
        assert_eq!(overview.level, 2);
        assert_eq!(overview.xp_into_level, 30);
        assert_eq!(overview.next_level_at, 200);
    }
}

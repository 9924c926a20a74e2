use crate::catalog::QuestCatalog;
use crate::content::Step;
use crate::core::world::{SessionView, Snapshot};
use crate::progress::{category_progress, profile_overview, UserProfile};
use crate::rules::SessionState;

pub fn render_status(catalog: &QuestCatalog, profile: Option<&UserProfile>) -> String {
    let mut output = String::new();
    output.push_str("=== Quest Dashboard ===\n");

    match profile {
        Some(profile) => {
            let overview = profile_overview(profile);
            output.push_str(&format!("User: {} ({})\n", profile.display_name(), profile.id()));
            output.push_str(&format!(
                "  Level {} | {} XP ({} / 100 into level, next at {})\n",
                overview.level, overview.total_xp, overview.xp_into_level, overview.next_level_at
            ));
            output.push_str(&format!(
                "  Completed: {} | Credentials: {} | Reputation: {}\n",
                overview.completed_quests, overview.credentials, overview.reputation
            ));
            output.push_str(&format!(
                "  Identity: {}\n",
                if overview.is_creator {
                    "verified (creator)"
                } else {
                    "unverified"
                }
            ));
            let authored: Vec<_> = catalog.created_by(&profile.id().0).collect();
            if !authored.is_empty() {
                output.push_str("  Authored:\n");
                for record in authored {
                    output.push_str(&format!(
                        "    {} - {}{}\n",
                        record.definition.id,
                        record.definition.title,
                        if record.definition.is_published { "" } else { " (draft)" }
                    ));
                }
            }
            if !profile.credentials().is_empty() {
                output.push_str("  Credentials:\n");
                for credential in profile.credentials() {
                    output.push_str(&format!(
                        "    {} [{:?}] for {}\n",
                        credential.id, credential.kind, credential.quest_id
                    ));
                }
            }
        }
        None => output.push_str("User: not connected\n"),
    }

    output.push_str("\nCategories\n");
    for category in category_progress(catalog, profile) {
        output.push_str(&format!(
            "  {}: {}/{} quests, {}/{} XP ({}%)\n",
            category.category,
            category.completed,
            category.total,
            category.earned_xp,
            category.total_xp,
            category.percent()
        ));
    }
    output
}

pub fn render_quest_list(catalog: &QuestCatalog, profile: Option<&UserProfile>) -> String {
    let mut output = String::new();
    output.push_str("=== Quests ===\n");
    if catalog.is_empty() {
        output.push_str("  (none)\n");
        return output;
    }

    let mut records: Vec<_> = catalog.list().collect();
    records.sort_by(|a, b| a.definition.category.cmp(&b.definition.category));
    for record in records {
        let quest = &record.definition;
        let done = profile.is_some_and(|profile| profile.has_completed(&quest.id));
        output.push_str(&format!(
            "{} {} - {} [{:?}, {}, {} XP, {} steps]\n",
            if done { "[x]" } else { "[ ]" },
            quest.id,
            quest.title,
            quest.difficulty,
            quest.duration,
            quest.xp,
            quest.steps.len()
        ));
        output.push_str(&format!(
            "    {} | {} completions, rating {:.1}{}\n",
            quest.category,
            record.completions,
            record.rating,
            if quest.is_published { "" } else { " | draft" }
        ));
        for step in &quest.steps {
            if let Step::Action { title, action, .. } = step {
                output.push_str(&format!("    Action: {} [{}]\n", title, action.label()));
            }
        }
        if let Some(prize) = &quest.prize {
            output.push_str(&format!(
                "    Prize: {} ({}) - {}\n",
                prize.name(),
                prize.kind(),
                prize.description()
            ));
        }
    }
    output
}

pub fn render_snapshot(snapshot: &Snapshot) -> String {
    let mut output = String::new();
    for line in &snapshot.log {
        output.push_str(&format!("> {}\n", line));
    }
    for session in &snapshot.sessions {
        output.push_str(&render_session(session));
    }
    if let Some(user) = &snapshot.user {
        output.push_str(&format!(
            "{}: level {}, {} XP\n",
            user.display_name, user.overview.level, user.overview.total_xp
        ));
    }
    output
}

fn render_session(session: &SessionView) -> String {
    let position = match session.state {
        SessionState::InProgress(_) => format!(
            "step {}/{}: {}",
            session.step_number,
            session.total_steps,
            session.current_step_title.as_deref().unwrap_or("?")
        ),
        SessionState::Completed => "completed".to_string(),
    };
    format!(
        "[{}] {} ({}%) {}\n",
        session.quest_id, session.title, session.progress_percent, position
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::content::{Difficulty, QuestDraft};
    use crate::progress::ProgressStore;
    use crate::rules::{create_quest, verify_identity};

    #[test]
    fn status_without_user_lists_seeded_categories() {
        let catalog = QuestCatalog::seeded();
        let output = render_status(&catalog, None);
        assert!(output.contains("not connected"));
        assert!(output.contains("Categories"));
    }

    #[test]
    fn quest_list_shows_prizes_and_counts() {
        let catalog = QuestCatalog::seeded();
        let profile = ProgressStore::connect();
        let output = render_quest_list(&catalog, Some(&profile));
        assert!(output.contains("first-swap"));
        assert!(output.contains("1247 completions"));
        assert!(output.contains("Prize:"));
        assert!(output.contains("[Connect Wallet]"));
        assert!(!output.contains("[x]"));
    }

    #[test]
    fn status_lists_quests_the_user_authored() {
        let mut catalog = QuestCatalog::seeded();
        let creator = verify_identity(&ProgressStore::connect());
        let draft = QuestDraft {
            title: "Gas Fees".to_string(),
            description: "What you pay to transact".to_string(),
            category: "DeFi Fundamentals".to_string(),
            xp: 30,
            duration: "3 min".to_string(),
            difficulty: Difficulty::Beginner,
            steps: vec![Step::Learn {
                title: "Gas".to_string(),
                content: "Every transaction costs gas.".to_string(),
            }],
            prize: None,
            is_published: false,
        };
        let (creator, quest) = create_quest(&creator, draft, &catalog, Utc::now()).expect("create");
        catalog.upsert(quest).expect("insert");

        let output = render_status(&catalog, Some(&creator));
        assert!(output.contains("Authored:"));
        assert!(output.contains("Gas Fees (draft)"));
    }
}

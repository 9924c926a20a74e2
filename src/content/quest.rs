use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QuestError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestId(pub String);

impl QuestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// Simulated action behind an action step. Unrecognised names are kept as
/// written so they survive a save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    ConnectWallet,
    SimulateSwap,
    Other(String),
}

impl ActionKind {
    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::ConnectWallet => "connect_wallet",
            ActionKind::SimulateSwap => "simulate_swap",
            ActionKind::Other(name) => name,
        }
    }

    /// Label of the control that performs the simulated action.
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::ConnectWallet => "Connect Wallet",
            ActionKind::SimulateSwap | ActionKind::Other(_) => "Execute Action",
        }
    }
}

impl From<String> for ActionKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "connect_wallet" => ActionKind::ConnectWallet,
            "simulate_swap" => ActionKind::SimulateSwap,
            _ => ActionKind::Other(value),
        }
    }
}

impl From<ActionKind> for String {
    fn from(value: ActionKind) -> Self {
        match value {
            ActionKind::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Step {
    Learn {
        title: String,
        content: String,
    },
    Action {
        title: String,
        content: String,
        action: ActionKind,
    },
    Quiz {
        title: String,
        content: String,
        question: String,
        options: Vec<String>,
        correct: usize,
    },
}

impl Step {
    pub fn title(&self) -> &str {
        match self {
            Step::Learn { title, .. } | Step::Action { title, .. } | Step::Quiz { title, .. } => {
                title
            }
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Step::Learn { content, .. }
            | Step::Action { content, .. }
            | Step::Quiz { content, .. } => content,
        }
    }

    pub fn is_quiz(&self) -> bool {
        matches!(self, Step::Quiz { .. })
    }

    fn validate(&self, index: usize) -> Result<(), QuestError> {
        if self.title().trim().is_empty() || self.content().trim().is_empty() {
            return Err(QuestError::Validation(format!(
                "step {} needs a title and content",
                index + 1
            )));
        }
        if let Step::Quiz {
            question,
            options,
            correct,
            ..
        } = self
        {
            if question.trim().is_empty() {
                return Err(QuestError::Validation(format!(
                    "quiz step {} has no question",
                    index + 1
                )));
            }
            if options.len() < 2 {
                return Err(QuestError::Validation(format!(
                    "quiz step {} needs at least two options",
                    index + 1
                )));
            }
            if *correct >= options.len() {
                return Err(QuestError::Validation(format!(
                    "quiz step {} marks option {} correct but has {} options",
                    index + 1,
                    correct,
                    options.len()
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrizeKind {
    #[serde(rename = "SBT")]
    SoulboundToken,
    #[serde(rename = "NFT")]
    Nft,
    Token,
}

impl fmt::Display for PrizeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrizeKind::SoulboundToken => write!(f, "SBT"),
            PrizeKind::Nft => write!(f, "NFT"),
            PrizeKind::Token => write!(f, "Token"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Prize {
    #[serde(rename = "SBT")]
    SoulboundToken {
        name: String,
        description: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        contract_address: Option<String>,
    },
    #[serde(rename = "NFT")]
    Nft {
        name: String,
        description: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        contract_address: Option<String>,
    },
    Token {
        name: String,
        description: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        contract_address: Option<String>,
        amount: u64,
    },
}

impl Prize {
    pub fn kind(&self) -> PrizeKind {
        match self {
            Prize::SoulboundToken { .. } => PrizeKind::SoulboundToken,
            Prize::Nft { .. } => PrizeKind::Nft,
            Prize::Token { .. } => PrizeKind::Token,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Prize::SoulboundToken { name, .. } | Prize::Nft { name, .. } | Prize::Token { name, .. } => {
                name
            }
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Prize::SoulboundToken { description, .. }
            | Prize::Nft { description, .. }
            | Prize::Token { description, .. } => description,
        }
    }
}

/// A quest as authored. The progression engine only ever reads these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestDefinition {
    pub id: QuestId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub creator_id: String,
    pub creator_name: String,
    pub xp: u32,
    pub duration: String,
    pub difficulty: Difficulty,
    pub steps: Vec<Step>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prize: Option<Prize>,
    #[serde(default)]
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl QuestDefinition {
    pub fn step(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn is_last_step(&self, index: usize) -> bool {
        index + 1 == self.steps.len()
    }

    pub fn validate(&self) -> Result<(), QuestError> {
        if self.id.0.trim().is_empty() {
            return Err(QuestError::Validation("quest id cannot be empty".to_string()));
        }
        if self.title.trim().is_empty() || self.description.trim().is_empty() {
            return Err(QuestError::Validation(format!(
                "quest {} needs a title and description",
                self.id
            )));
        }
        if self.xp == 0 {
            return Err(QuestError::Validation(format!(
                "quest {} must reward a positive amount of xp",
                self.id
            )));
        }
        if self.steps.is_empty() {
            return Err(QuestError::Validation(format!("quest {} has no steps", self.id)));
        }
        for (index, step) in self.steps.iter().enumerate() {
            step.validate(index)?;
        }
        if let Some(prize) = &self.prize {
            if prize.name().trim().is_empty() {
                return Err(QuestError::Validation(format!(
                    "quest {} has a prize without a name",
                    self.id
                )));
            }
        }
        Ok(())
    }
}

/// Author-supplied part of a new quest. Identity, creator and counters are
/// filled in when the quest is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub xp: u32,
    pub duration: String,
    pub difficulty: Difficulty,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub prize: Option<Prize>,
    #[serde(default)]
    pub is_published: bool,
}

pub fn validate_unique_ids<'a>(
    quests: impl IntoIterator<Item = &'a QuestDefinition>,
) -> Result<(), QuestError> {
    let mut ids = HashSet::new();
    for quest in quests {
        quest.validate()?;
        if !ids.insert(quest.id.clone()) {
            return Err(QuestError::Validation(format!("duplicate quest id {}", quest.id)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn learn(title: &str) -> Step {
        Step::Learn {
            title: title.to_string(),
            content: "Read this.".to_string(),
        }
    }

    fn quest(steps: Vec<Step>) -> QuestDefinition {
        QuestDefinition {
            id: QuestId::from("q1"),
            title: "Quest".to_string(),
            description: "A quest".to_string(),
            category: "Security".to_string(),
            creator_id: "system".to_string(),
            creator_name: "Quest Team".to_string(),
            xp: 50,
            duration: "5 min".to_string(),
            difficulty: Difficulty::Beginner,
            steps,
            prize: None,
            is_published: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn step_json_uses_lowercase_type_tag() {
        let raw = r#"{"type":"quiz","title":"Q","content":"C","question":"?","options":["A","B"],"correct":1}"#;
        let step: Step = serde_json::from_str(raw).expect("quiz step parses");
        assert!(step.is_quiz());

        let action: Step =
            serde_json::from_str(r#"{"type":"action","title":"T","content":"C","action":"bridge_assets"}"#)
                .expect("unknown action kinds parse");
        assert_eq!(
            action,
            Step::Action {
                title: "T".to_string(),
                content: "C".to_string(),
                action: ActionKind::Other("bridge_assets".to_string()),
            }
        );
        let saved = serde_json::to_value(&action).expect("encode");
        assert_eq!(saved["action"], "bridge_assets");
    }

    #[test]
    fn known_action_kinds_keep_snake_case_names() {
        let kind: ActionKind = serde_json::from_str(r#""simulate_swap""#).expect("parse");
        assert_eq!(kind, ActionKind::SimulateSwap);
        assert_eq!(kind.label(), "Execute Action");
        assert_eq!(
            serde_json::to_string(&ActionKind::ConnectWallet).expect("encode"),
            r#""connect_wallet""#
        );
    }

    #[test]
    fn prize_tags_follow_short_names() {
        let prize: Prize =
            serde_json::from_str(r#"{"type":"SBT","name":"Pioneer","description":"d"}"#).expect("sbt");
        assert_eq!(prize.kind(), PrizeKind::SoulboundToken);

        let token: Prize = serde_json::from_str(
            r#"{"type":"Token","name":"Drop","description":"d","amount":25}"#,
        )
        .expect("token");
        assert!(matches!(token, Prize::Token { amount: 25, .. }));
    }

    #[test]
    fn validation_rejects_empty_quests_and_bad_quizzes() {
        assert!(quest(vec![]).validate().is_err());

        let bad_quiz = Step::Quiz {
            title: "Quiz".to_string(),
            content: "Pick one".to_string(),
            question: "Which?".to_string(),
            options: vec!["A".to_string(), "B".to_string()],
            correct: 2,
        };
        assert!(quest(vec![learn("Intro"), bad_quiz]).validate().is_err());
        assert!(quest(vec![learn("Intro")]).validate().is_ok());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let a = quest(vec![learn("Intro")]);
        let b = a.clone();
        assert!(validate_unique_ids([&a, &b]).is_err());
    }
}

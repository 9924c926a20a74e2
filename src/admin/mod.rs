//! Admin data management for the quest list shown in the admin console.
//! Independent of the progression engine: these records carry reward
//! metadata only.

pub mod repository;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use repository::{AdminQuestRepository, AdminStoreError, InMemoryAdminQuests};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RewardType {
    #[serde(rename = "SBT")]
    Sbt,
    #[serde(rename = "NFT")]
    Nft,
    #[serde(rename = "ETH")]
    Eth,
    #[serde(rename = "ERC20")]
    Erc20,
}

impl fmt::Display for RewardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RewardType::Sbt => "SBT",
            RewardType::Nft => "NFT",
            RewardType::Eth => "ETH",
            RewardType::Erc20 => "ERC20",
        };
        f.write_str(label)
    }
}

impl FromStr for RewardType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "SBT" => Ok(RewardType::Sbt),
            "NFT" => Ok(RewardType::Nft),
            "ETH" => Ok(RewardType::Eth),
            "ERC20" => Ok(RewardType::Erc20),
            other => Err(format!("unknown reward type {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminQuest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub reward_type: RewardType,
    pub reward_amount: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submitted form fields. Missing or blank text counts as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminQuestForm {
    pub title: String,
    pub description: String,
    pub reward_type: Option<RewardType>,
    pub reward_amount: String,
    pub is_published: bool,
}

impl AdminQuestForm {
    fn required(&self) -> Option<RewardType> {
        let filled = [&self.title, &self.description, &self.reward_amount]
            .iter()
            .all(|field| !field.trim().is_empty());
        self.reward_type.filter(|_| filled)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }

    fn failed(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
        }
    }
}

const MSG_REQUIRED: &str = "All fields are required.";
const MSG_NOT_FOUND: &str = "Quest not found.";
const MSG_STORE_FAILED: &str = "Quest store unavailable.";

pub struct AdminQuestService {
    repo: Arc<dyn AdminQuestRepository>,
}

impl AdminQuestService {
    pub fn new(repo: Arc<dyn AdminQuestRepository>) -> Self {
        Self { repo }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryAdminQuests::new()))
    }

    pub fn create(&self, form: AdminQuestForm) -> ActionResponse {
        self.create_at(form, Utc::now())
    }

    fn create_at(&self, form: AdminQuestForm, now: DateTime<Utc>) -> ActionResponse {
        let Some(reward_type) = form.required() else {
            return ActionResponse::failed(MSG_REQUIRED);
        };
        let result = self.repo.next_id(now).and_then(|id| {
            self.repo.insert(AdminQuest {
                id: id.clone(),
                title: form.title,
                description: form.description,
                reward_type,
                reward_amount: form.reward_amount,
                is_published: form.is_published,
                created_at: now,
                updated_at: now,
            })?;
            info!(quest = %id, "admin quest created");
            Ok(true)
        });
        respond(result, "Quest created successfully!")
    }

    /// Newest first; ties broken by id, newest id first.
    pub fn list(&self) -> Result<Vec<AdminQuest>, AdminStoreError> {
        let mut quests = self.repo.all()?;
        quests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(quests)
    }

    pub fn get(&self, id: &str) -> Result<Option<AdminQuest>, AdminStoreError> {
        self.repo.find(id)
    }

    pub fn update(&self, id: &str, form: AdminQuestForm) -> ActionResponse {
        let Some(reward_type) = form.required() else {
            return ActionResponse::failed(MSG_REQUIRED);
        };
        let result = self.repo.find(id).and_then(|existing| {
            let Some(existing) = existing else {
                return Ok(false);
            };
            self.repo.replace(AdminQuest {
                title: form.title,
                description: form.description,
                reward_type,
                reward_amount: form.reward_amount,
                is_published: form.is_published,
                updated_at: Utc::now().max(existing.created_at),
                ..existing
            })
        });
        respond(result, "Quest updated successfully!")
    }

    pub fn delete(&self, id: &str) -> ActionResponse {
        respond(self.repo.remove(id), "Quest deleted successfully!")
    }
}

fn respond(result: Result<bool, AdminStoreError>, success: &str) -> ActionResponse {
    match result {
        Ok(true) => ActionResponse::ok(success),
        Ok(false) => ActionResponse::failed(MSG_NOT_FOUND),
        Err(err) => {
            warn!(error = %err, "admin quest store failed");
            ActionResponse::failed(MSG_STORE_FAILED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn form(title: &str) -> AdminQuestForm {
        AdminQuestForm {
            title: title.to_string(),
            description: "Learn the basics".to_string(),
            reward_type: Some(RewardType::Erc20),
            reward_amount: "25".to_string(),
            is_published: false,
        }
    }

    fn at(offset_secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).single().expect("time") + Duration::seconds(offset_secs)
    }

    #[test]
    fn create_requires_every_field() {
        let service = AdminQuestService::in_memory();
        let mut missing = form("Staking");
        missing.reward_type = None;
        assert_eq!(service.create(missing), ActionResponse::failed("All fields are required."));

        let blank = AdminQuestForm {
            reward_amount: " ".to_string(),
            ..form("Staking")
        };
        assert!(!service.create(blank).success);
        assert!(service.list().expect("list").is_empty());
    }

    #[test]
    fn create_then_list_newest_first() {
        let service = AdminQuestService::in_memory();
        let response = service.create_at(form("Old"), at(0));
        assert_eq!(response, ActionResponse::ok("Quest created successfully!"));
        service.create_at(form("New"), at(60));

        let titles: Vec<String> = service
            .list()
            .expect("list")
            .into_iter()
            .map(|quest| quest.title)
            .collect();
        assert_eq!(titles, vec!["New".to_string(), "Old".to_string()]);
    }

    #[test]
    fn update_replaces_fields_and_keeps_identity() {
        let service = AdminQuestService::in_memory();
        service.create_at(form("Bridges"), at(0));
        let id = service.list().expect("list")[0].id.clone();

        let mut edited = form("Bridges v2");
        edited.reward_type = Some(RewardType::Nft);
        edited.is_published = true;
        assert_eq!(
            service.update(&id, edited),
            ActionResponse::ok("Quest updated successfully!")
        );

        let quest = service.get(&id).expect("get").expect("present");
        assert_eq!(quest.title, "Bridges v2");
        assert_eq!(quest.reward_type, RewardType::Nft);
        assert!(quest.is_published);
        assert_eq!(quest.created_at, at(0));
        assert!(quest.updated_at >= quest.created_at);
    }

    #[test]
    fn update_and_delete_report_missing_quests() {
        let service = AdminQuestService::in_memory();
        assert_eq!(
            service.update("quest-0", form("Ghost")),
            ActionResponse::failed("Quest not found.")
        );
        assert_eq!(service.delete("quest-0"), ActionResponse::failed("Quest not found."));
    }

    #[test]
    fn update_validates_like_create() {
        let service = AdminQuestService::in_memory();
        service.create_at(form("Bridges"), at(0));
        let id = service.list().expect("list")[0].id.clone();
        let response = service.update(&id, AdminQuestForm::default());
        assert_eq!(response, ActionResponse::failed("All fields are required."));
        assert_eq!(service.get(&id).expect("get").map(|q| q.title), Some("Bridges".to_string()));
    }

    #[test]
    fn delete_removes_the_record() {
        let service = AdminQuestService::in_memory();
        service.create_at(form("Bridges"), at(0));
        let id = service.list().expect("list")[0].id.clone();
        assert_eq!(service.delete(&id), ActionResponse::ok("Quest deleted successfully!"));
        assert!(service.get(&id).expect("get").is_none());
    }

    struct BrokenStore;

    impl AdminQuestRepository for BrokenStore {
        fn next_id(&self, _now: DateTime<Utc>) -> Result<String, AdminStoreError> {
            Ok("quest-1".to_string())
        }
        fn insert(&self, _quest: AdminQuest) -> Result<(), AdminStoreError> {
            Err(AdminStoreError::Poisoned)
        }
        fn all(&self) -> Result<Vec<AdminQuest>, AdminStoreError> {
            Err(AdminStoreError::Poisoned)
        }
        fn find(&self, _id: &str) -> Result<Option<AdminQuest>, AdminStoreError> {
            Err(AdminStoreError::Poisoned)
        }
        fn replace(&self, _quest: AdminQuest) -> Result<bool, AdminStoreError> {
            Err(AdminStoreError::Poisoned)
        }
        fn remove(&self, _id: &str) -> Result<bool, AdminStoreError> {
            Err(AdminStoreError::Poisoned)
        }
    }

    #[test]
    fn failed_insert_is_not_reported_as_created() {
        let service = AdminQuestService::new(Arc::new(BrokenStore));
        assert_eq!(
            service.create(form("Staking")),
            ActionResponse::failed("Quest store unavailable.")
        );
        assert!(service.list().is_err());
    }

    #[test]
    fn reward_type_parses_labels() {
        assert_eq!("erc20".parse::<RewardType>(), Ok(RewardType::Erc20));
        assert_eq!(RewardType::Sbt.to_string(), "SBT");
        assert!("DOGE".parse::<RewardType>().is_err());
    }
}

use std::mem;

use bevy_ecs::prelude::*;
use tracing::{debug, info, warn};

use crate::catalog::QuestCatalog;
use crate::config::AppConfig;
use crate::content::{PrizeKind, QuestDraft, QuestId};
use crate::core::ecs::{create_schedule, create_world};
use crate::core::staging::{IntentOutcome, SessionBook, StagedChanges};
use crate::error::QuestError;
use crate::persistence::{KeyValueStore, SqliteKvStore};
use crate::progress::{profile_overview, ProfileOverview, ProgressStore, UserId, UserProfile};
use crate::rules::{ClaimPolicy, QuestSession, SessionState};
use crate::systems::ProgressEventLog;

/// User actions fed into the ECS, one per dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestIntent {
    Connect,
    VerifyIdentity,
    OpenQuest { quest_id: QuestId },
    CloseQuest { quest_id: QuestId },
    Advance { quest_id: QuestId },
    SubmitAnswer { quest_id: QuestId, selected: usize },
    ClaimPrize { quest_id: QuestId },
    MintCredential { quest_id: QuestId },
    CreateQuest { draft: QuestDraft },
    PublishQuest { quest_id: QuestId },
}

/// Resource holding the intent for the current run.
#[derive(Resource, Default, Debug)]
pub struct ActiveIntent(pub Option<QuestIntent>);

/// Data snapshot returned to the view layer after each dispatch.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub outcome: Option<IntentOutcome>,
    pub user: Option<UserSummary>,
    pub sessions: Vec<SessionView>,
    pub log: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct UserSummary {
    pub id: UserId,
    pub display_name: String,
    pub identity_verified: bool,
    pub overview: ProfileOverview,
}

#[derive(Debug, Clone)]
pub struct SessionView {
    pub quest_id: QuestId,
    pub title: String,
    pub state: SessionState,
    /// One-based; equals `total_steps` once completed.
    pub step_number: usize,
    pub total_steps: usize,
    pub progress_percent: u8,
    pub current_step_title: Option<String>,
    pub already_completed: bool,
    pub prize: Option<(PrizeKind, String)>,
}

/// Wrapper around the ECS world, its schedule and the durable store.
pub struct QuestApp {
    world: World,
    schedule: Schedule,
    kv: Box<dyn KeyValueStore>,
    last_outcome: Option<IntentOutcome>,
}

impl QuestApp {
    /// Loads (or seeds) the catalog and the saved user from `kv`.
    pub fn new(mut kv: Box<dyn KeyValueStore>, policy: ClaimPolicy) -> Result<Self, QuestError> {
        let catalog = QuestCatalog::load_or_seed(kv.as_mut())?;
        let mut store = ProgressStore::default();
        store.load(kv.as_ref())?;
        info!(quests = catalog.len(), ?policy, "quest app ready");

        Ok(Self {
            world: create_world(catalog, store, policy),
            schedule: create_schedule(),
            kv,
            last_outcome: None,
        })
    }

    /// Opens the SQLite database named by the config.
    pub fn open(config: &AppConfig) -> Result<Self, QuestError> {
        let kv = SqliteKvStore::open(&config.db_path)?;
        Self::new(Box::new(kv), config.claim_policy)
    }

    /// Runs one intent through the schedule. Staged changes reach memory only
    /// after every affected snapshot has been written; on any failure the
    /// world is left exactly as it was.
    pub fn dispatch(&mut self, intent: QuestIntent) -> Result<Snapshot, QuestError> {
        debug!(?intent, "dispatch");
        self.world.resource_mut::<ActiveIntent>().0 = Some(intent);
        let committed_log = mem::take(&mut self.world.resource_mut::<ProgressEventLog>().0);
        self.world.insert_resource(StagedChanges::default());

        self.schedule.run(&mut self.world);

        self.world.resource_mut::<ActiveIntent>().0 = None;
        let mut staged = mem::take(&mut *self.world.resource_mut::<StagedChanges>());
        let result = match staged.error.take() {
            Some(err) => {
                debug!(error = %err, "intent rejected");
                Err(err)
            }
            None => self.commit(&mut staged),
        };
        if let Err(err) = result {
            // Lines written during the run describe changes that never landed.
            self.world.resource_mut::<ProgressEventLog>().0 = committed_log;
            return Err(err);
        }

        self.last_outcome = staged.outcome.clone();
        Ok(self.snapshot())
    }

    fn commit(&mut self, staged: &mut StagedChanges) -> Result<(), QuestError> {
        let mut entries: Vec<(&str, Vec<u8>)> = Vec::new();

        let user_key = self.world.resource::<ProgressStore>().key().to_string();
        if let Some(profile) = staged.profile.as_ref() {
            entries.push((user_key.as_str(), ProgressStore::encode(profile)?));
        }

        let next_catalog = if staged.touches_catalog() {
            let mut catalog = self.world.resource::<QuestCatalog>().clone();
            for quest in staged.quests.drain(..) {
                catalog.upsert(quest)?;
            }
            for quest_id in &staged.completions {
                catalog.increment_completions(quest_id)?;
            }
            Some(catalog)
        } else {
            None
        };
        let catalog_key = next_catalog
            .as_ref()
            .map(|catalog| catalog.key().to_string())
            .unwrap_or_default();
        if let Some(catalog) = next_catalog.as_ref() {
            entries.push((catalog_key.as_str(), catalog.encode()?));
        }

        if !entries.is_empty() {
            if let Err(err) = self.kv.set_batch(&entries) {
                warn!(error = %err, "snapshot write failed; changes discarded");
                return Err(err.into());
            }
        }

        if let Some(profile) = staged.profile.take() {
            self.world.resource_mut::<ProgressStore>().accept(profile);
        }
        if let Some(catalog) = next_catalog {
            self.world.insert_resource(catalog);
        }
        staged.apply_sessions(&mut self.world.resource_mut::<SessionBook>());
        Ok(())
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.world.resource::<ProgressStore>().current()
    }

    pub fn catalog(&self) -> &QuestCatalog {
        self.world.resource::<QuestCatalog>()
    }

    pub fn session(&self, quest_id: &QuestId) -> Option<&QuestSession> {
        self.world.resource::<SessionBook>().get(quest_id)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.world, self.last_outcome.clone())
    }
}

impl Snapshot {
    fn capture(world: &World, outcome: Option<IntentOutcome>) -> Self {
        let catalog = world.resource::<QuestCatalog>();
        let profile = world.resource::<ProgressStore>().current();

        let user = profile.map(|profile| UserSummary {
            id: profile.id().clone(),
            display_name: profile.display_name(),
            identity_verified: profile.identity_verified(),
            overview: profile_overview(profile),
        });

        let mut sessions: Vec<SessionView> = world
            .resource::<SessionBook>()
            .0
            .values()
            .filter_map(|session| {
                let quest = catalog.get_by_id(session.quest_id())?;
                let total_steps = quest.steps.len();
                let step_number = session
                    .step_index()
                    .map(|index| index + 1)
                    .unwrap_or(total_steps);
                Some(SessionView {
                    quest_id: quest.id.clone(),
                    title: quest.title.clone(),
                    state: session.state(),
                    step_number,
                    total_steps,
                    progress_percent: session.progress_percent(total_steps),
                    current_step_title: session
                        .step_index()
                        .and_then(|index| quest.step(index))
                        .map(|step| step.title().to_string()),
                    already_completed: profile.is_some_and(|p| p.has_completed(&quest.id)),
                    prize: quest
                        .prize
                        .as_ref()
                        .map(|prize| (prize.kind(), prize.name().to_string())),
                })
            })
            .collect();
        sessions.sort_by(|a, b| a.quest_id.cmp(&b.quest_id));

        Self {
            outcome,
            user,
            sessions,
            log: world.resource::<ProgressEventLog>().0.clone(),
        }
    }
}

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::{ExecutorKind, SystemSet};

use crate::catalog::QuestCatalog;
use crate::core::staging::{SessionBook, StagedChanges};
use crate::core::world::ActiveIntent;
use crate::progress::ProgressStore;
use crate::rules::ClaimPolicy;
use crate::systems::account::account_system;
use crate::systems::authoring::authoring_system;
use crate::systems::progression::{session_intake_system, step_system};
use crate::systems::rewards::reward_system;
use crate::systems::ProgressEventLog;

/// Canonical ordering of intent handling.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum IntentSet {
    Intake,
    Progression,
    Rewards,
    Authoring,
}

/// Build the ECS world around an already loaded catalog and profile store.
pub fn create_world(catalog: QuestCatalog, store: ProgressStore, policy: ClaimPolicy) -> World {
    let mut world = World::new();
    world.insert_resource(catalog);
    world.insert_resource(store);
    world.insert_resource(policy);
    world.insert_resource(ActiveIntent::default());
    world.insert_resource(SessionBook::default());
    world.insert_resource(StagedChanges::default());
    world.insert_resource(ProgressEventLog::default());
    world
}

/// Build the intent schedule. One intent is handled per run, on one thread.
pub fn create_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);

    schedule.configure_sets(
        (
            IntentSet::Intake,
            IntentSet::Progression,
            IntentSet::Rewards,
            IntentSet::Authoring,
        )
            .chain(),
    );

    schedule.add_systems((
        account_system.in_set(IntentSet::Intake),
        session_intake_system
            .in_set(IntentSet::Intake)
            .after(account_system),
        step_system.in_set(IntentSet::Progression),
        reward_system.in_set(IntentSet::Rewards),
        authoring_system.in_set(IntentSet::Authoring),
    ));

    schedule
}

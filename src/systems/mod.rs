pub mod account;
pub mod authoring;
pub mod progression;
pub mod rewards;

use bevy_ecs::prelude::*;

use crate::catalog::QuestCatalog;
use crate::content::{QuestDefinition, QuestId};
use crate::core::staging::StagedChanges;
use crate::error::{Lookup, QuestError};
use crate::progress::{ProgressStore, UserProfile};

/// Human-readable lines describing the last dispatch.
#[derive(Resource, Default, Debug)]
pub struct ProgressEventLog(pub Vec<String>);

/// Profile the current intent should build on: whatever an earlier system
/// staged, otherwise the committed one.
fn working_profile(store: &ProgressStore, staged: &StagedChanges) -> Result<UserProfile, QuestError> {
    staged
        .profile
        .clone()
        .or_else(|| store.current().cloned())
        .ok_or(QuestError::NotFound(Lookup::User))
}

fn lookup_quest<'c>(catalog: &'c QuestCatalog, quest_id: &QuestId) -> Result<&'c QuestDefinition, QuestError> {
    catalog.require(quest_id)
}

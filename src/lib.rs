// Re-export core modules for use by the binary or other consumers
pub mod admin;
pub mod catalog;
pub mod config;
pub mod content;
pub mod core;
pub mod data;
pub mod error;
pub mod logging;
pub mod persistence;
pub mod progress;
pub mod rules;
pub mod systems;
pub mod ui;

// Expose the app wrapper and the types needed to drive it
pub use crate::core::staging::IntentOutcome;
pub use crate::core::world::{QuestApp, QuestIntent, SessionView, Snapshot, UserSummary};
pub use crate::error::QuestError;

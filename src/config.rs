use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::rules::ClaimPolicy;

pub const DEFAULT_DB_PATH: &str = "questline.db";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidVar { var: &'static str, reason: String },
}

/// Runtime settings. Environment first, then CLI flags on top.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub claim_policy: ClaimPolicy,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            claim_policy: ClaimPolicy::Once,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|var| env::var(var).ok())?;
        Ok(config)
    }

    /// Applies `QUESTLINE_*` overrides read through `lookup`. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        if let Some(path) = read("QUESTLINE_DB") {
            self.db_path = PathBuf::from(path);
        }
        if let Some(policy) = read("QUESTLINE_CLAIM_POLICY") {
            self.claim_policy = policy.parse().map_err(|reason| ConfigError::InvalidVar {
                var: "QUESTLINE_CLAIM_POLICY",
                reason,
            })?;
        }
        // RUST_LOG still wins when set; see logging::init_logging.
        if let Some(filter) = read("QUESTLINE_LOG") {
            self.log_filter = filter;
        }
        Ok(())
    }
}

//! Environment-driven configuration.
//!
//! Every setting has a default, so an empty environment yields a usable
//! in-memory setup with logging disabled.

use crate::logging::default_log_level;
use crate::model::release::DEFAULT_COORDINATOR;
use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GITHUB_ORG: &str = "Sage";
pub const DEFAULT_SOP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => write!(f, "{key}: invalid value `{value}`"),
        }
    }
}

impl Error for ConfigError {}

/// Settings for the SOP_VERSION lookup client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SopConfig {
    pub api_base: String,
    pub org: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for SopConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_GITHUB_API_URL.to_string(),
            org: DEFAULT_GITHUB_ORG.to_string(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_SOP_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// `None` opens an in-memory database.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// `None` leaves logging uninitialized.
    pub log_dir: Option<String>,
    pub default_coordinator: String,
    pub sop: SopConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            default_coordinator: DEFAULT_COORDINATOR.to_string(),
            sop: SopConfig::default(),
        }
    }
}

impl TrackerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let timeout = match get("SOP_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "SOP_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            },
            None => defaults.sop.timeout,
        };

        Ok(Self {
            db_path: get("RELEASE_TRACKER_DB_PATH").map(PathBuf::from),
            log_level: get("RELEASE_TRACKER_LOG_LEVEL").unwrap_or(defaults.log_level),
            log_dir: get("RELEASE_TRACKER_LOG_DIR"),
            default_coordinator: get("RELEASE_TRACKER_DEFAULT_COORDINATOR")
                .unwrap_or(defaults.default_coordinator),
            sop: SopConfig {
                api_base: get("SOP_GITHUB_API_URL").unwrap_or(defaults.sop.api_base),
                org: get("SOP_GITHUB_ORG").unwrap_or(defaults.sop.org),
                token: get("SOP_GITHUB_TOKEN"),
                timeout,
            },
        })
    }
}

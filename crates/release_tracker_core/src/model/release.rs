//! Release record.
//!
//! # Responsibility
//! - Define the scheduled-release record and its per-component versions.
//! - Provide validation and the pre-persist normalization step.
//!
//! # Invariants
//! - `date` is required for persistence; `validate()` enforces it.
//! - Empty version strings mean "no version for this release" and are not
//!   kept in `versions`.

use crate::model::app_slot::AppSlot;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-managed primary key.
pub type ReleaseId = i64;

/// Status assigned to new releases.
pub const DEFAULT_STATUS: &str = "UAT";

/// Coordinator assigned on save when none is given.
pub const DEFAULT_COORDINATOR: &str = "Russell Craxford";

/// A scheduled deployment with per-component versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// `None` until the row is inserted.
    pub id: Option<ReleaseId>,
    pub date: Option<NaiveDate>,
    pub status: String,
    pub coordinator: Option<String>,
    pub notes: Option<String>,
    pub versions: BTreeMap<AppSlot, String>,
}

/// Validation failure raised before any write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseValidationError {
    MissingDate,
}

impl Display for ReleaseValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDate => write!(f, "release date can't be blank"),
        }
    }
}

impl Error for ReleaseValidationError {}

impl Release {
    /// Creates an unsaved release scheduled on `date`.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Self::default()
        }
    }

    /// Builder-style version assignment, mostly for callers composing a
    /// release in one expression.
    pub fn with_version(mut self, app: AppSlot, version: impl Into<String>) -> Self {
        self.set_version(app, version);
        self
    }

    /// Version recorded for `app` on this release, if non-empty.
    pub fn version_for(&self, app: AppSlot) -> Option<&str> {
        self.versions
            .get(&app)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Sets the version for `app`; an empty string clears it.
    pub fn set_version(&mut self, app: AppSlot, version: impl Into<String>) {
        let version = version.into();
        if version.is_empty() {
            self.versions.remove(&app);
        } else {
            self.versions.insert(app, version);
        }
    }

    pub fn validate(&self) -> Result<(), ReleaseValidationError> {
        if self.date.is_none() {
            return Err(ReleaseValidationError::MissingDate);
        }
        Ok(())
    }

    /// Applies save-time defaults: a blank or missing coordinator becomes
    /// `default_coordinator`.
    pub fn normalize_for_save(&mut self, default_coordinator: &str) {
        let blank = match self.coordinator.as_deref() {
            Some(value) => value.trim().is_empty(),
            None => true,
        };
        if blank {
            self.coordinator = Some(default_coordinator.to_string());
        }
    }
}

impl Default for Release {
    fn default() -> Self {
        Self {
            id: None,
            date: None,
            status: DEFAULT_STATUS.to_string(),
            coordinator: None,
            notes: None,
            versions: BTreeMap::new(),
        }
    }
}

//! Release use-case service.
//!
//! # Responsibility
//! - Provide create/update/get/delete/list entry points for releases.
//! - Resolve per-component versions with fallback to earlier releases.
//! - Answer "last release" and "next release" relative to today.
//!
//! # Invariants
//! - Service APIs never bypass repository validation and normalization.
//! - Version fallback only considers releases dated on or before the given
//!   release.

use crate::model::app_slot::AppSlot;
use crate::model::release::{Release, ReleaseId, ReleaseValidationError};
use crate::model::version::latest_version;
use crate::repo::release_repo::{
    normalize_release_limit, ReleaseListQuery, ReleaseRepository, RepoError, RepoResult,
};
use chrono::{Local, NaiveDate};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Placeholder returned when no release ever recorded a version for an app.
pub const NO_VERSION: &str = "-";

/// Service error for release use-cases.
#[derive(Debug)]
pub enum ReleaseServiceError {
    Validation(ReleaseValidationError),
    ReleaseNotFound(ReleaseId),
    Repo(RepoError),
    /// Write succeeded but the read-back did not find the row.
    InconsistentState(&'static str),
}

impl Display for ReleaseServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid release: {err}"),
            Self::ReleaseNotFound(id) => write!(f, "release not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent release state: {details}"),
        }
    }
}

impl Error for ReleaseServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ReleaseServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::NotFound(id) => Self::ReleaseNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Page of releases plus the page size actually applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasesPage {
    pub items: Vec<Release>,
    pub applied_limit: u32,
}

/// Release service facade over repository implementations.
pub struct ReleaseService<R: ReleaseRepository> {
    repo: R,
}

impl<R: ReleaseRepository> ReleaseService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates, normalizes and inserts a release, returning the stored row.
    ///
    /// # Errors
    /// - `Validation` when the release has no date; nothing is written.
    pub fn create_release(&self, release: &Release) -> Result<Release, ReleaseServiceError> {
        let id = self.repo.create_release(release)?;
        info!("event=release_create module=service status=ok release_id={id}");
        self.repo
            .get_release(id)?
            .ok_or(ReleaseServiceError::InconsistentState(
                "created release not found in read-back",
            ))
    }

    /// Replaces all fields of a stored release, returning the stored row.
    pub fn update_release(&self, release: &Release) -> Result<Release, ReleaseServiceError> {
        self.repo.update_release(release)?;
        let id = release.id.ok_or(ReleaseServiceError::InconsistentState(
            "updated release has no id",
        ))?;
        self.repo
            .get_release(id)?
            .ok_or(ReleaseServiceError::InconsistentState(
                "updated release not found in read-back",
            ))
    }

    pub fn get_release(&self, id: ReleaseId) -> RepoResult<Option<Release>> {
        self.repo.get_release(id)
    }

    pub fn delete_release(&self, id: ReleaseId) -> Result<(), ReleaseServiceError> {
        self.repo.delete_release(id)?;
        info!("event=release_delete module=service status=ok release_id={id}");
        Ok(())
    }

    pub fn count_releases(&self) -> RepoResult<u64> {
        self.repo.count_releases()
    }

    /// Lists releases newest first.
    pub fn list_releases(&self, limit: Option<u32>, offset: u32) -> RepoResult<ReleasesPage> {
        let applied_limit = normalize_release_limit(limit);
        let items = self.repo.list_releases(&ReleaseListQuery {
            limit: Some(applied_limit),
            offset,
        })?;
        Ok(ReleasesPage {
            items,
            applied_limit,
        })
    }

    /// Resolves the version of `app` shipped with `release`.
    ///
    /// Returns `None` without a release. A version recorded on the release
    /// wins; otherwise the greatest version among releases dated on or
    /// before it is used, and [`NO_VERSION`] when there is none.
    pub fn version(&self, app: AppSlot, release: Option<&Release>) -> RepoResult<Option<String>> {
        let Some(release) = release else {
            return Ok(None);
        };
        if let Some(version) = release.version_for(app) {
            return Ok(Some(version.to_string()));
        }
        let Some(date) = release.date else {
            return Ok(Some(NO_VERSION.to_string()));
        };

        let candidates = self.repo.versions_up_to(app, date)?;
        debug!(
            "event=version_fallback module=service app={app} candidates={}",
            candidates.len()
        );
        Ok(Some(
            latest_version(candidates).unwrap_or_else(|| NO_VERSION.to_string()),
        ))
    }

    /// Most recent release dated before today.
    pub fn last_release(&self) -> RepoResult<Option<Release>> {
        self.last_release_on(today())
    }

    pub fn last_release_on(&self, today: NaiveDate) -> RepoResult<Option<Release>> {
        self.repo.last_release_before(today)
    }

    /// Earliest release dated today or later.
    pub fn next_release(&self) -> RepoResult<Option<Release>> {
        self.next_release_on(today())
    }

    pub fn next_release_on(&self, today: NaiveDate) -> RepoResult<Option<Release>> {
        self.repo.next_release_from(today)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

//! Core release tracking logic.
//! This crate owns the release record, its storage and the SOP lookup.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;
pub mod sop;

pub use config::{ConfigError, SopConfig, TrackerConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::app_slot::{repositories, AppSlot, UnknownAppSlot};
pub use model::release::{
    Release, ReleaseId, ReleaseValidationError, DEFAULT_COORDINATOR, DEFAULT_STATUS,
};
pub use model::version::{compare_versions, latest_version, VersionKey};
pub use repo::release_note_repo::SqliteReleaseNoteRepository;
pub use repo::release_repo::{
    ReleaseListQuery, ReleaseRepository, RepoError, RepoResult, SqliteReleaseRepository,
};
pub use search::filter::{search_filter, ReleaseFilter};
pub use service::release_service::{ReleaseService, ReleaseServiceError, ReleasesPage, NO_VERSION};
pub use sop::{sop_version, ContentsApi, GithubContentsClient, SopError, UNKNOWN_SOP_VERSION};

/// Minimal health-check API for wiring probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

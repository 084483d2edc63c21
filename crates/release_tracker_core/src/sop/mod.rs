//! SOP_VERSION marker lookup.
//!
//! # Responsibility
//! - Fetch the `SOP_VERSION` file of a repository at the `v<version>.rc1`
//!   tag and decode it.
//! - Turn every failure into the [`UNKNOWN_SOP_VERSION`] placeholder.
//!
//! # Invariants
//! - [`sop_version`] never returns an error and never panics on bad input.
//! - Every lookup is bounded by the client timeout.

mod github;

pub use github::GithubContentsClient;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::string::FromUtf8Error;

/// Placeholder returned when the marker file cannot be read.
pub const UNKNOWN_SOP_VERSION: &str = "?";

/// Path of the marker file inside each repository.
pub const SOP_VERSION_PATH: &str = "SOP_VERSION";

#[derive(Debug)]
pub enum SopError {
    Transport(reqwest::Error),
    Status(u16),
    MissingContent,
    Decode(base64::DecodeError),
    Utf8(FromUtf8Error),
}

impl Display for SopError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "contents request failed: {err}"),
            Self::Status(status) => write!(f, "contents request returned status {status}"),
            Self::MissingContent => write!(f, "contents response has no content"),
            Self::Decode(err) => write!(f, "invalid base64 content: {err}"),
            Self::Utf8(err) => write!(f, "content is not utf-8: {err}"),
        }
    }
}

impl Error for SopError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::Utf8(err) => Some(err),
            Self::Status(_) | Self::MissingContent => None,
        }
    }
}

impl From<reqwest::Error> for SopError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value)
    }
}

impl From<base64::DecodeError> for SopError {
    fn from(value: base64::DecodeError) -> Self {
        Self::Decode(value)
    }
}

impl From<FromUtf8Error> for SopError {
    fn from(value: FromUtf8Error) -> Self {
        Self::Utf8(value)
    }
}

/// Source of base64-encoded file contents from a hosted repository.
pub trait ContentsApi {
    /// Returns the encoded `content` field for `path` at `git_ref`, or
    /// `None` when the response carries no content.
    fn file_contents(&self, repo: &str, path: &str, git_ref: &str)
        -> Result<Option<String>, SopError>;
}

/// Tag holding the SOP marker for a release version.
pub fn sop_ref(version: &str) -> String {
    format!("v{version}.rc1")
}

/// Looks up the SOP version shipped with `repo` at `version`.
///
/// Returns the decoded marker file verbatim (including any trailing
/// newline), or [`UNKNOWN_SOP_VERSION`] on any failure.
pub fn sop_version<A: ContentsApi + ?Sized>(api: &A, repo: &str, version: &str) -> String {
    let git_ref = sop_ref(version);
    match fetch_sop_version(api, repo, &git_ref) {
        Ok(value) => {
            info!("event=sop_lookup module=sop status=ok repo={repo} ref={git_ref}");
            value
        }
        Err(err) => {
            warn!(
                "event=sop_lookup module=sop status=fallback repo={repo} ref={git_ref} error={err}"
            );
            UNKNOWN_SOP_VERSION.to_string()
        }
    }
}

fn fetch_sop_version<A: ContentsApi + ?Sized>(
    api: &A,
    repo: &str,
    git_ref: &str,
) -> Result<String, SopError> {
    let encoded = api
        .file_contents(repo, SOP_VERSION_PATH, git_ref)?
        .ok_or(SopError::MissingContent)?;
    decode_content(&encoded)
}

/// Decodes a contents-API payload; embedded line breaks are ignored.
pub fn decode_content(encoded: &str) -> Result<String, SopError> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact)?;
    Ok(String::from_utf8(bytes)?)
}

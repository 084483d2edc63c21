//! Dotted version ordering.
//!
//! Each `.`-separated segment is read by its leading ASCII digits. A segment
//! with no leading digits counts as `0`, so `"3rc1"` orders as `3` and
//! `"beta"` as `0`. Keys compare segment by segment; a strict prefix sorts
//! lower (`1.0 < 1.0.0`).

use std::cmp::Ordering;

/// Comparable key derived from a version string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct VersionKey(Vec<u64>);

impl VersionKey {
    pub fn parse(version: &str) -> Self {
        Self(version.split('.').map(leading_number).collect())
    }

    pub fn segments(&self) -> &[u64] {
        &self.0
    }
}

/// Compares two version strings by [`VersionKey`].
pub fn compare_versions(left: &str, right: &str) -> Ordering {
    VersionKey::parse(left).cmp(&VersionKey::parse(right))
}

/// Returns the greatest version; on equal keys the later item wins.
pub fn latest_version<I, S>(versions: I) -> Option<S>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    versions
        .into_iter()
        .max_by(|left, right| compare_versions(left.as_ref(), right.as_ref()))
}

fn leading_number(segment: &str) -> u64 {
    let digits_end = segment
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(segment.len());
    // Saturate instead of failing on absurdly long digit runs.
    segment[..digits_end]
        .parse::<u64>()
        .unwrap_or(if digits_end == 0 { 0 } else { u64::MAX })
}

//! Substring filter over release notes.
//!
//! # Invariants
//! - A blank term applies no filter.
//! - The term is matched literally: `%`, `_` and `\` are escaped.
//! - Matching follows SQLite `LIKE` (ASCII case-insensitive).
//! - Releases without an annotation still match on their own `notes`.

use crate::model::release::Release;
use crate::repo::release_repo::{
    collect_releases, normalize_release_limit, RepoResult, RELEASE_SELECT_SQL,
};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

/// Filter options for [`search_filter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseFilter {
    /// Search term; `None` or blank lists everything.
    pub text: Option<String>,
    /// Page size. Defaults to 10 and clamps to 50.
    pub limit: Option<u32>,
    pub offset: u32,
}

impl ReleaseFilter {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

/// Returns releases whose notes or release-note text contain the term,
/// newest date first.
pub fn search_filter(conn: &Connection, filter: &ReleaseFilter) -> RepoResult<Vec<Release>> {
    let mut sql = format!(
        "{RELEASE_SELECT_SQL}
         LEFT JOIN release_notes ON release_notes.release_id = releases.id"
    );
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(pattern) = filter.text.as_deref().and_then(like_pattern) {
        sql.push_str(
            " WHERE release_notes.release_notes LIKE ? ESCAPE '\\'
                 OR releases.notes LIKE ? ESCAPE '\\'",
        );
        bind_values.push(Value::Text(pattern.clone()));
        bind_values.push(Value::Text(pattern));
    }

    sql.push_str(" ORDER BY releases.date DESC, releases.id DESC LIMIT ? OFFSET ?");
    bind_values.push(Value::Integer(i64::from(normalize_release_limit(
        filter.limit,
    ))));
    bind_values.push(Value::Integer(i64::from(filter.offset)));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query(params_from_iter(bind_values))?;
    collect_releases(rows)
}

fn like_pattern(term: &str) -> Option<String> {
    if term.trim().is_empty() {
        return None;
    }
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    Some(escaped)
}

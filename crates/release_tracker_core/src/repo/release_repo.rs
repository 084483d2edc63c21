//! Release repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and date-ordered queries over the `releases` table.
//! - Run validation and save-time normalization before every write.
//!
//! # Invariants
//! - Write paths call `Release::validate()` and
//!   `Release::normalize_for_save()` before SQL mutations.
//! - Version columns are addressed only through `AppSlot::as_str()`.
//! - Read paths reject malformed persisted dates instead of masking them.

use crate::db::DbError;
use crate::model::app_slot::AppSlot;
use crate::model::release::{Release, ReleaseId, ReleaseValidationError, DEFAULT_COORDINATOR};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

const RELEASES_DEFAULT_LIMIT: u32 = 10;
const RELEASES_LIMIT_MAX: u32 = 50;
const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) const RELEASE_SELECT_SQL: &str = "SELECT
    releases.id AS id,
    releases.date AS date,
    releases.status AS status,
    releases.coordinator AS coordinator,
    releases.notes AS notes,
    releases.accounts AS accounts,
    releases.accounts_extra AS accounts_extra,
    releases.addons AS addons,
    releases.mysageone AS mysageone,
    releases.payroll AS payroll,
    releases.collaborate AS collaborate,
    releases.accounts_production AS accounts_production,
    releases.sageone_corp_tax_uk AS sageone_corp_tax_uk,
    releases.help AS help,
    releases.accountant_edition AS accountant_edition
FROM releases";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for release persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ReleaseValidationError),
    Db(DbError),
    NotFound(ReleaseId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "release not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted release data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing; run migrations first")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<ReleaseValidationError> for RepoError {
    fn from(value: ReleaseValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Pagination for release listings, newest date first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseListQuery {
    /// Maximum rows to return. Defaults to 10 and clamps to 50.
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for release records.
pub trait ReleaseRepository {
    /// Inserts a new release and returns its storage id.
    fn create_release(&self, release: &Release) -> RepoResult<ReleaseId>;
    /// Replaces every field of an existing release.
    fn update_release(&self, release: &Release) -> RepoResult<()>;
    fn get_release(&self, id: ReleaseId) -> RepoResult<Option<Release>>;
    fn delete_release(&self, id: ReleaseId) -> RepoResult<()>;
    fn count_releases(&self) -> RepoResult<u64>;
    fn list_releases(&self, query: &ReleaseListQuery) -> RepoResult<Vec<Release>>;
    /// Non-empty `app` versions of releases dated on or before `date`.
    fn versions_up_to(&self, app: AppSlot, date: NaiveDate) -> RepoResult<Vec<String>>;
    /// Latest release dated strictly before `today`.
    fn last_release_before(&self, today: NaiveDate) -> RepoResult<Option<Release>>;
    /// Earliest release dated on or after `today`.
    fn next_release_from(&self, today: NaiveDate) -> RepoResult<Option<Release>>;
}

/// SQLite-backed release repository.
pub struct SqliteReleaseRepository<'conn> {
    conn: &'conn Connection,
    default_coordinator: String,
}

impl<'conn> SqliteReleaseRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_exists(conn, "releases")?;
        Ok(Self {
            conn,
            default_coordinator: DEFAULT_COORDINATOR.to_string(),
        })
    }

    /// Overrides the coordinator written for releases saved without one.
    pub fn with_default_coordinator(mut self, coordinator: impl Into<String>) -> Self {
        self.default_coordinator = coordinator.into();
        self
    }

    fn prepared(&self, release: &Release) -> RepoResult<(Release, String)> {
        release.validate()?;
        let mut normalized = release.clone();
        normalized.normalize_for_save(&self.default_coordinator);
        let date = normalized
            .date
            .map(|date| date.format(DATE_FORMAT).to_string())
            .ok_or(RepoError::Validation(ReleaseValidationError::MissingDate))?;
        Ok((normalized, date))
    }
}

impl ReleaseRepository for SqliteReleaseRepository<'_> {
    fn create_release(&self, release: &Release) -> RepoResult<ReleaseId> {
        let (release, date) = self.prepared(release)?;
        let mut bind_values = vec![
            Value::Text(date),
            Value::Text(release.status.clone()),
            Value::Text(release.coordinator.clone().unwrap_or_default()),
            optional_text(release.notes.as_deref()),
        ];
        bind_values.extend(version_values(&release));

        let columns = AppSlot::ALL.map(AppSlot::as_str).join(", ");
        let placeholders = vec!["?"; 4 + AppSlot::ALL.len()].join(", ");
        self.conn.execute(
            &format!(
                "INSERT INTO releases (date, status, coordinator, notes, {columns})
                 VALUES ({placeholders});"
            ),
            params_from_iter(bind_values),
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_release(&self, release: &Release) -> RepoResult<()> {
        let id = release
            .id
            .ok_or_else(|| RepoError::InvalidData("cannot update an unsaved release".to_string()))?;
        let (release, date) = self.prepared(release)?;
        let mut bind_values = vec![
            Value::Text(date),
            Value::Text(release.status.clone()),
            Value::Text(release.coordinator.clone().unwrap_or_default()),
            optional_text(release.notes.as_deref()),
        ];
        bind_values.extend(version_values(&release));
        bind_values.push(Value::Integer(id));

        let assignments = AppSlot::ALL
            .iter()
            .map(|slot| format!("{} = ?", slot.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        let changed = self.conn.execute(
            &format!(
                "UPDATE releases
                 SET
                    date = ?,
                    status = ?,
                    coordinator = ?,
                    notes = ?,
                    {assignments},
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?;"
            ),
            params_from_iter(bind_values),
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn get_release(&self, id: ReleaseId) -> RepoResult<Option<Release>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RELEASE_SELECT_SQL} WHERE releases.id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_release_row(row)?));
        }
        Ok(None)
    }

    fn delete_release(&self, id: ReleaseId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM releases WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn count_releases(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM releases;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative release count `{count}`")))
    }

    fn list_releases(&self, query: &ReleaseListQuery) -> RepoResult<Vec<Release>> {
        let sql = format!(
            "{RELEASE_SELECT_SQL}
             ORDER BY releases.date DESC, releases.id DESC
             LIMIT ?1 OFFSET ?2;"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query(params![
            i64::from(normalize_release_limit(query.limit)),
            i64::from(query.offset)
        ])?;
        collect_releases(rows)
    }

    fn versions_up_to(&self, app: AppSlot, date: NaiveDate) -> RepoResult<Vec<String>> {
        let column = app.as_str();
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {column}
             FROM releases
             WHERE {column} != ''
               AND date <= ?1
             ORDER BY date ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([date.format(DATE_FORMAT).to_string()])?;
        let mut versions = Vec::new();
        while let Some(row) = rows.next()? {
            versions.push(row.get(0)?);
        }
        Ok(versions)
    }

    fn last_release_before(&self, today: NaiveDate) -> RepoResult<Option<Release>> {
        self.first_matching(
            "WHERE releases.date < ?1 ORDER BY releases.date DESC, releases.id DESC",
            today,
        )
    }

    fn next_release_from(&self, today: NaiveDate) -> RepoResult<Option<Release>> {
        self.first_matching(
            "WHERE releases.date >= ?1 ORDER BY releases.date ASC, releases.id ASC",
            today,
        )
    }
}

impl SqliteReleaseRepository<'_> {
    fn first_matching(&self, clause: &str, today: NaiveDate) -> RepoResult<Option<Release>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RELEASE_SELECT_SQL} {clause} LIMIT 1;"))?;
        let release = stmt
            .query_row([today.format(DATE_FORMAT).to_string()], |row| {
                Ok(parse_release_row(row))
            })
            .optional()?;
        release.transpose()
    }
}

/// Normalizes a page size according to the listing contract.
pub fn normalize_release_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => RELEASES_DEFAULT_LIMIT,
        Some(value) if value > RELEASES_LIMIT_MAX => RELEASES_LIMIT_MAX,
        Some(value) => value,
    }
}

pub(crate) fn collect_releases(mut rows: rusqlite::Rows<'_>) -> RepoResult<Vec<Release>> {
    let mut releases = Vec::new();
    while let Some(row) = rows.next()? {
        releases.push(parse_release_row(row)?);
    }
    Ok(releases)
}

pub(crate) fn parse_release_row(row: &Row<'_>) -> RepoResult<Release> {
    let date_text: String = row.get("date")?;
    let date = NaiveDate::parse_from_str(&date_text, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid date `{date_text}` in releases.date"))
    })?;

    let mut versions = BTreeMap::new();
    for slot in AppSlot::ALL {
        let value: Option<String> = row.get(slot.as_str())?;
        if let Some(value) = value.filter(|value| !value.is_empty()) {
            versions.insert(slot, value);
        }
    }

    Ok(Release {
        id: Some(row.get("id")?),
        date: Some(date),
        status: row.get("status")?,
        coordinator: row.get("coordinator")?,
        notes: row.get("notes")?,
        versions,
    })
}

pub(crate) fn ensure_table_exists(conn: &Connection, table: &'static str) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Ok(())
    } else {
        Err(RepoError::MissingRequiredTable(table))
    }
}

fn version_values(release: &Release) -> impl Iterator<Item = Value> + '_ {
    AppSlot::ALL
        .into_iter()
        .map(|slot| Value::Text(release.version_for(slot).unwrap_or_default().to_string()))
}

fn optional_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |text| Value::Text(text.to_string()))
}

//! Release-note annotations.
//!
//! Each release has at most one free-text release note, kept in
//! `release_notes` and removed together with its release. Only the text is
//! modelled here; it is what the search filter matches against.

use crate::model::release::ReleaseId;
use crate::repo::release_repo::{ensure_table_exists, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Release-note storage bound to one connection.
pub struct SqliteReleaseNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReleaseNoteRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_table_exists(conn, "release_notes")?;
        Ok(Self { conn })
    }

    /// Creates or replaces the note text attached to `release_id`.
    pub fn set_release_note(&self, release_id: ReleaseId, text: &str) -> RepoResult<()> {
        let release_exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM releases WHERE id = ?1);",
            [release_id],
            |row| row.get(0),
        )?;
        if release_exists != 1 {
            return Err(RepoError::NotFound(release_id));
        }

        self.conn.execute(
            "INSERT INTO release_notes (release_id, release_notes)
             VALUES (?1, ?2)
             ON CONFLICT (release_id) DO UPDATE SET
                release_notes = excluded.release_notes,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![release_id, text],
        )?;
        Ok(())
    }

    pub fn get_release_note(&self, release_id: ReleaseId) -> RepoResult<Option<String>> {
        let text = self
            .conn
            .query_row(
                "SELECT release_notes FROM release_notes WHERE release_id = ?1;",
                [release_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(text)
    }
}

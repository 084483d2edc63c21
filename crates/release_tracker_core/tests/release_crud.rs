use chrono::NaiveDate;
use release_tracker_core::db::open_db_in_memory;
use release_tracker_core::{
    AppSlot, Release, ReleaseRepository, ReleaseService, ReleaseServiceError,
    ReleaseValidationError, RepoError, SqliteReleaseRepository, DEFAULT_COORDINATOR,
};
use rusqlite::Connection;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

fn full_release(date: NaiveDate) -> Release {
    let mut release = Release::new(date)
        .with_version(AppSlot::MySageOne, "1.0")
        .with_version(AppSlot::Payroll, "3.2.1");
    release.coordinator = Some("Alice".to_string());
    release.notes = Some("Quarterly rollout".to_string());
    release
}

fn count(conn: &Connection) -> u64 {
    SqliteReleaseRepository::try_new(conn)
        .unwrap()
        .count_releases()
        .unwrap()
}

#[test]
fn create_with_valid_attributes_increments_count() {
    let conn = open_db_in_memory().unwrap();
    let service = ReleaseService::new(SqliteReleaseRepository::try_new(&conn).unwrap());

    let created = service.create_release(&full_release(day(10))).unwrap();
    assert_eq!(count(&conn), 1);
    assert!(created.id.is_some());
    assert_eq!(created.date, Some(day(10)));
    assert_eq!(created.coordinator.as_deref(), Some("Alice"));
    assert_eq!(created.notes.as_deref(), Some("Quarterly rollout"));
    assert_eq!(created.version_for(AppSlot::Payroll), Some("3.2.1"));
    assert_eq!(created.version_for(AppSlot::Help), None);
}

#[test]
fn create_without_date_fails_validation_and_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = ReleaseService::new(SqliteReleaseRepository::try_new(&conn).unwrap());

    let mut release = full_release(day(10));
    release.date = None;
    let err = service.create_release(&release).unwrap_err();
    assert!(matches!(
        err,
        ReleaseServiceError::Validation(ReleaseValidationError::MissingDate)
    ));
    assert_eq!(count(&conn), 0);
}

#[test]
fn date_only_release_gets_default_status_and_coordinator() {
    let conn = open_db_in_memory().unwrap();
    let service = ReleaseService::new(SqliteReleaseRepository::try_new(&conn).unwrap());

    let created = service.create_release(&Release::new(day(11))).unwrap();
    assert_eq!(created.status, "UAT");
    assert_eq!(created.coordinator.as_deref(), Some(DEFAULT_COORDINATOR));
    assert!(created.versions.is_empty());
}

#[test]
fn explicit_coordinator_is_kept_and_blank_is_defaulted() {
    let conn = open_db_in_memory().unwrap();
    let service = ReleaseService::new(SqliteReleaseRepository::try_new(&conn).unwrap());

    let mut bob = Release::new(day(12));
    bob.coordinator = Some("Bob".to_string());
    assert_eq!(
        service.create_release(&bob).unwrap().coordinator.as_deref(),
        Some("Bob")
    );

    let mut blank = Release::new(day(12));
    blank.coordinator = Some(String::new());
    assert_eq!(
        service.create_release(&blank).unwrap().coordinator.as_deref(),
        Some(DEFAULT_COORDINATOR)
    );
}

#[test]
fn configured_default_coordinator_is_applied() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReleaseRepository::try_new(&conn)
        .unwrap()
        .with_default_coordinator("Dana");
    let service = ReleaseService::new(repo);

    let created = service.create_release(&Release::new(day(13))).unwrap();
    assert_eq!(created.coordinator.as_deref(), Some("Dana"));
}

#[test]
fn update_replaces_fields_and_reapplies_coordinator_default() {
    let conn = open_db_in_memory().unwrap();
    let service = ReleaseService::new(SqliteReleaseRepository::try_new(&conn).unwrap());

    let mut release = service.create_release(&full_release(day(14))).unwrap();
    release.status = "Live".to_string();
    release.coordinator = None;
    release.set_version(AppSlot::MySageOne, "");
    release.set_version(AppSlot::Help, "0.9");

    let updated = service.update_release(&release).unwrap();
    assert_eq!(updated.status, "Live");
    assert_eq!(updated.coordinator.as_deref(), Some(DEFAULT_COORDINATOR));
    assert_eq!(updated.version_for(AppSlot::MySageOne), None);
    assert_eq!(updated.version_for(AppSlot::Help), Some("0.9"));
}

#[test]
fn update_unknown_release_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = ReleaseService::new(SqliteReleaseRepository::try_new(&conn).unwrap());

    let mut release = Release::new(day(15));
    release.id = Some(4242);
    let err = service.update_release(&release).unwrap_err();
    assert!(matches!(err, ReleaseServiceError::ReleaseNotFound(4242)));
}

#[test]
fn deleting_a_release_reduces_the_count_by_one() {
    let conn = open_db_in_memory().unwrap();
    let service = ReleaseService::new(SqliteReleaseRepository::try_new(&conn).unwrap());

    service.create_release(&full_release(day(16))).unwrap();
    let doomed = service.create_release(&full_release(day(17))).unwrap();
    assert_eq!(service.count_releases().unwrap(), 2);

    service.delete_release(doomed.id.unwrap()).unwrap();
    assert_eq!(service.count_releases().unwrap(), 1);
    assert!(service.get_release(doomed.id.unwrap()).unwrap().is_none());
}

#[test]
fn deleting_a_missing_release_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteReleaseRepository::try_new(&conn).unwrap();
    assert!(matches!(repo.delete_release(7), Err(RepoError::NotFound(7))));
}

#[test]
fn list_is_newest_first_and_paginated() {
    let conn = open_db_in_memory().unwrap();
    let service = ReleaseService::new(SqliteReleaseRepository::try_new(&conn).unwrap());
    for d in 1..=12 {
        service.create_release(&Release::new(day(d))).unwrap();
    }

    let first_page = service.list_releases(None, 0).unwrap();
    assert_eq!(first_page.applied_limit, 10);
    assert_eq!(first_page.items.len(), 10);
    assert_eq!(first_page.items[0].date, Some(day(12)));

    let second_page = service.list_releases(Some(10), 10).unwrap();
    assert_eq!(second_page.items.len(), 2);
    assert_eq!(second_page.items[1].date, Some(day(1)));
}

#[test]
fn repository_requires_migrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    assert!(matches!(
        SqliteReleaseRepository::try_new(&conn),
        Err(RepoError::MissingRequiredTable("releases"))
    ));
}

#[test]
fn malformed_persisted_date_is_reported() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO releases (date, coordinator) VALUES ('next tuesday', 'Bob');",
        [],
    )
    .unwrap();
    let repo = SqliteReleaseRepository::try_new(&conn).unwrap();
    let id = conn.last_insert_rowid();
    assert!(matches!(repo.get_release(id), Err(RepoError::InvalidData(_))));
}

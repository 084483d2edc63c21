//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define data access contracts for releases and their annotations.
//! - Keep SQLite query details out of the service layer.
//!
//! # Invariants
//! - Release writes enforce `Release::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod release_note_repo;
pub mod release_repo;

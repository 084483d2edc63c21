//! Release domain model.
//!
//! # Responsibility
//! - Define the `Release` record and the closed set of tracked components.
//! - Own version-string ordering used for fallback resolution.
//!
//! # Invariants
//! - A persisted release always carries a date and a non-blank coordinator.
//! - Component names only ever come from `AppSlot`.

pub mod app_slot;
pub mod release;
pub mod version;

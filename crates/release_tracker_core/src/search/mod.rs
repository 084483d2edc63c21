//! Release search entry points.
//!
//! # Responsibility
//! - Expose substring filtering over release notes and release-note
//!   annotations.
//! - Keep result shaping (ordering, pagination) inside core.

pub mod filter;

//! Snapshot storage
//!
//! The `projects` and `sections` tables are filled by the upstream sync job.
//! This crate only reads them, apart from schema creation and the insert
//! helpers used for seeding.

pub mod init;
pub mod queries;

pub use init::*;
pub use queries::*;

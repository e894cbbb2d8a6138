//! # pdyn Common Library
//!
//! Shared code for the project dynamics service:
//! - Progress tag catalog and tag resolution
//! - Section snapshots and timeline reconstruction
//! - Project records and project-level progress views
//! - Database schema and queries
//! - Configuration loading

pub mod catalog;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod projects;
pub mod resolver;
pub mod snapshot;
pub mod time;
pub mod timeline;

pub use catalog::{ProgressTag, TagCatalog};
pub use error::{Error, Result};
pub use resolver::TagResolver;
pub use snapshot::{RawSnapshot, ResolvedSnapshot};
pub use timeline::{ProgressValue, ProjectTimeline, TimelineReconstructor};

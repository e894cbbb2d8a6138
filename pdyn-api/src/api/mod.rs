//! HTTP API handlers for pdyn-api

pub mod error;
pub mod health;
pub mod projects;
pub mod sections;
pub mod timeline;

pub use error::ApiError;
pub use health::health_routes;
pub use projects::{get_project, list_projects};
pub use sections::{get_project_tags, list_sections};
pub use timeline::get_project_timeline;

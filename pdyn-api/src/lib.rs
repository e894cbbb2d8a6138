//! pdyn-api library - read-only project dynamics service
//!
//! Serves projects, section snapshots, resolved progress tags and
//! reconstructed progress timelines from the snapshot database.

use std::sync::Arc;

use axum::Router;
use pdyn_common::timeline::DEFAULT_AVERAGE_LABEL;
use pdyn_common::{TagResolver, TimelineReconstructor};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (read-only)
    pub db: SqlitePool,
    pub resolver: Arc<TagResolver>,
    pub reconstructor: Arc<TimelineReconstructor>,
    /// Name of the average series in timeline responses
    pub average_label: Arc<str>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, resolver: TagResolver, reconstructor: TimelineReconstructor) -> Self {
        Self {
            db,
            resolver: Arc::new(resolver),
            reconstructor: Arc::new(reconstructor),
            average_label: Arc::from(DEFAULT_AVERAGE_LABEL),
        }
    }

    pub fn with_average_label(mut self, label: &str) -> Self {
        self.average_label = Arc::from(label);
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let api = Router::new()
        .route("/api/projects", get(api::list_projects))
        .route("/api/projects/:project_id", get(api::get_project))
        .route("/api/projects/:project_id/timeline", get(api::get_project_timeline))
        .route("/api/sections", get(api::list_sections))
        .route("/api/tags/project/:project_id", get(api::get_project_tags));

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

//! Project endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use pdyn_common::db;
use pdyn_common::projects::{projects_with_progress, ProjectRecord, ProjectWithSections};
use tracing::debug;

use super::error::{parse_project_id, ApiError};
use crate::AppState;

/// GET /api/projects
///
/// Lists projects where at least one section reports progress above 0%.
pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProjectRecord>>, ApiError> {
    let projects = db::list_projects(&state.db).await?;
    let sections = db::list_sections(&state.db, None).await?;
    let total = projects.len();

    let started = projects_with_progress(projects, &sections, &state.resolver);
    debug!("{} of {} projects have reported progress", started.len(), total);

    Ok(Json(started))
}

/// GET /api/projects/:project_id
///
/// One project with all of its section snapshots.
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<ProjectWithSections>, ApiError> {
    let ws_project_id = parse_project_id(&project_id)?;

    let project = db::get_project(&state.db, ws_project_id).await?;
    let sections = db::list_sections(&state.db, Some(ws_project_id)).await?;

    Ok(Json(ProjectWithSections { project, sections }))
}

//! Section and progress tag endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use pdyn_common::db;
use pdyn_common::projects::{sections_with_progress, ProjectSectionsResponse};
use pdyn_common::RawSnapshot;
use serde::Deserialize;

use super::error::{parse_project_id, ApiError};
use crate::AppState;

/// Query parameters for section listing
#[derive(Debug, Deserialize)]
pub struct SectionsQuery {
    /// Restrict to one project; kept as text so a bad value yields a JSON 400
    pub ws_project_id: Option<String>,
}

/// GET /api/sections?ws_project_id=N
///
/// Raw section snapshots, all or for one project.
pub async fn list_sections(
    State(state): State<AppState>,
    Query(query): Query<SectionsQuery>,
) -> Result<Json<Vec<RawSnapshot>>, ApiError> {
    let project_id = match query.ws_project_id.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(parse_project_id(raw)?),
    };

    let sections = db::list_sections(&state.db, project_id).await?;
    Ok(Json(sections))
}

/// GET /api/tags/project/:project_id
///
/// Sections of a project with their resolved progress tag.
pub async fn get_project_tags(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<ProjectSectionsResponse>, ApiError> {
    let ws_project_id = parse_project_id(&project_id)?;

    let project = db::get_project(&state.db, ws_project_id).await?;
    let sections = db::list_sections(&state.db, Some(ws_project_id)).await?;

    Ok(Json(ProjectSectionsResponse {
        ws_project_id,
        project_name: project.name,
        sections: sections_with_progress(sections, &state.resolver),
    }))
}

//! Progress timeline endpoint
//!
//! Chart and table views both read this response: one column per presented
//! date, one row per section, and the average row.

use axum::{
    extract::{Path, State},
    Json,
};
use pdyn_common::db;
use pdyn_common::snapshot::resolve_all;
use pdyn_common::time::{format_day_label, month_spans, MonthSpan};
use pdyn_common::timeline::{ProgressValue, ProjectTimeline, AVERAGE_COLOR};
use serde::Serialize;
use tracing::debug;

use super::error::{parse_project_id, ApiError};
use crate::AppState;

/// One chart line or table row
#[derive(Debug, Serialize)]
pub struct SeriesResponse {
    pub name: String,
    pub color: String,
    pub progress: Vec<ProgressValue>,
}

/// Timeline response
#[derive(Debug, Serialize)]
pub struct TimelineResponse {
    pub ws_project_id: i64,
    pub project_name: Option<String>,
    /// Column labels, `DD.MM.YYYY`
    pub dates: Vec<String>,
    /// Month header spans over `dates`
    pub months: Vec<MonthSpan>,
    pub sections: Vec<SeriesResponse>,
    pub average: SeriesResponse,
    /// Leading dates dropped because nothing had progressed yet
    pub trimmed_leading: usize,
}

impl TimelineResponse {
    pub fn new(
        ws_project_id: i64,
        project_name: Option<String>,
        timeline: ProjectTimeline,
        average_label: &str,
    ) -> Self {
        let months = month_spans(&timeline.dates);
        let dates = timeline.dates.iter().copied().map(format_day_label).collect();

        let sections = timeline
            .sections
            .into_iter()
            .map(|section| SeriesResponse {
                progress: section.values().collect(),
                name: section.name,
                color: section.color,
            })
            .collect();

        Self {
            ws_project_id,
            project_name,
            dates,
            months,
            sections,
            average: SeriesResponse {
                name: average_label.to_string(),
                color: AVERAGE_COLOR.to_string(),
                progress: timeline.average,
            },
            trimmed_leading: timeline.trimmed_leading,
        }
    }
}

/// GET /api/projects/:project_id/timeline
///
/// Rebuilt from the stored snapshots on every request.
pub async fn get_project_timeline(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<TimelineResponse>, ApiError> {
    let ws_project_id = parse_project_id(&project_id)?;

    let project = db::get_project(&state.db, ws_project_id).await?;
    let snapshots = db::list_sections(&state.db, Some(ws_project_id)).await?;
    let snapshot_count = snapshots.len();

    let resolved = resolve_all(snapshots, &state.resolver);
    let timeline = state.reconstructor.reconstruct(&resolved);

    debug!(
        "Project {}: {} snapshots -> {} dates, {} sections",
        ws_project_id,
        snapshot_count,
        timeline.dates.len(),
        timeline.sections.len()
    );

    Ok(Json(TimelineResponse::new(
        ws_project_id,
        project.name,
        timeline,
        &state.average_label,
    )))
}

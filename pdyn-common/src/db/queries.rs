//! Project and section queries

use serde_json::Value;
use sqlx::SqlitePool;
use tracing::warn;

use crate::projects::{ProjectRecord, ProjectStatus};
use crate::resolver::TagMap;
use crate::snapshot::RawSnapshot;
use crate::{Error, Result};

type ProjectRow = (String, i64, Option<String>, Option<String>, Option<String>);
type SectionRow = (i64, Option<String>, i64, String, Option<String>);

/// All projects, ordered by upstream id
pub async fn list_projects(pool: &SqlitePool) -> Result<Vec<ProjectRecord>> {
    let rows = sqlx::query_as::<_, ProjectRow>(
        "SELECT id, ws_project_id, name, user_to, status FROM projects ORDER BY ws_project_id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(project_from_row).collect())
}

/// One project by upstream id
pub async fn get_project(pool: &SqlitePool, ws_project_id: i64) -> Result<ProjectRecord> {
    let row = sqlx::query_as::<_, ProjectRow>(
        "SELECT id, ws_project_id, name, user_to, status FROM projects WHERE ws_project_id = ?",
    )
    .bind(ws_project_id)
    .fetch_optional(pool)
    .await?;

    row.map(project_from_row)
        .ok_or_else(|| Error::NotFound(format!("Project {}", ws_project_id)))
}

/// Section snapshots, optionally restricted to one project, in insertion order
pub async fn list_sections(
    pool: &SqlitePool,
    ws_project_id: Option<i64>,
) -> Result<Vec<RawSnapshot>> {
    let rows = match ws_project_id {
        Some(project_id) => {
            sqlx::query_as::<_, SectionRow>(
                "SELECT ws_section_id, name, ws_project_id, created_at, tags
                 FROM sections WHERE ws_project_id = ? ORDER BY id",
            )
            .bind(project_id)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, SectionRow>(
                "SELECT ws_section_id, name, ws_project_id, created_at, tags
                 FROM sections ORDER BY id",
            )
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows.into_iter().map(section_from_row).collect())
}

/// Insert or replace a project row
pub async fn insert_project(pool: &SqlitePool, project: &ProjectRecord) -> Result<()> {
    let user_to = project
        .user_to
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    sqlx::query(
        "INSERT OR REPLACE INTO projects (id, ws_project_id, name, user_to, status)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&project.id)
    .bind(project.ws_project_id)
    .bind(&project.name)
    .bind(user_to)
    .bind(project.status.map(ProjectStatus::as_str))
    .execute(pool)
    .await?;

    Ok(())
}

/// Append a section snapshot, returning its row id
pub async fn insert_section(pool: &SqlitePool, section: &RawSnapshot) -> Result<i64> {
    let tags = section.tags.as_ref().map(serde_json::to_string).transpose()?;

    let result = sqlx::query(
        "INSERT INTO sections (ws_section_id, ws_project_id, name, created_at, tags)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(section.ws_section_id)
    .bind(section.ws_project_id)
    .bind(&section.name)
    .bind(&section.created_at)
    .bind(tags)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

fn project_from_row((id, ws_project_id, name, user_to, status): ProjectRow) -> ProjectRecord {
    let user_to = user_to.and_then(|raw| match serde_json::from_str::<Value>(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Project {}: ignoring malformed user_to: {}", ws_project_id, e);
            None
        }
    });

    let status = status.and_then(|raw| {
        let parsed = ProjectStatus::parse(&raw);
        if parsed.is_none() {
            warn!("Project {}: unknown status {:?}", ws_project_id, raw);
        }
        parsed
    });

    ProjectRecord {
        id,
        ws_project_id,
        name,
        user_to,
        status,
    }
}

fn section_from_row(
    (ws_section_id, name, ws_project_id, created_at, tags): SectionRow,
) -> RawSnapshot {
    let tags = tags.and_then(|raw| match serde_json::from_str::<TagMap>(&raw) {
        Ok(map) => Some(map),
        Err(e) => {
            warn!("Section {}: ignoring malformed tags: {}", ws_section_id, e);
            None
        }
    });

    RawSnapshot {
        ws_section_id,
        name,
        ws_project_id,
        created_at,
        tags,
    }
}

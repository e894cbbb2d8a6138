//! Project records and project-level progress views

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resolver::{parse_percent, TagResolver};
use crate::snapshot::RawSnapshot;

/// Project lifecycle status as stored by the sync job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "not active")]
    NotActive,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::NotActive => "not active",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ProjectStatus::Active),
            "not active" => Some(ProjectStatus::NotActive),
            _ => None,
        }
    }
}

/// Row of the `projects` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    pub ws_project_id: i64,
    pub name: Option<String>,
    /// Assignee payload from the upstream tracker, kept as opaque JSON
    pub user_to: Option<Value>,
    pub status: Option<ProjectStatus>,
}

impl ProjectRecord {
    /// Name for display, falling back to the upstream id
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("Project {}", self.ws_project_id),
        }
    }
}

/// Project together with every section snapshot it owns
#[derive(Debug, Clone, Serialize)]
pub struct ProjectWithSections {
    #[serde(flatten)]
    pub project: ProjectRecord,
    pub sections: Vec<RawSnapshot>,
}

/// Colour band for a single progress label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressBand {
    /// Up to 30%
    Low,
    /// Up to 70%
    Medium,
    High,
}

impl ProgressBand {
    /// `None` when there is no tag or its label is not a percentage
    pub fn classify(tag: Option<&str>) -> Option<Self> {
        let percent = parse_percent(tag?)?;
        Some(match percent {
            0..=30 => ProgressBand::Low,
            31..=70 => ProgressBand::Medium,
            _ => ProgressBand::High,
        })
    }
}

/// Section snapshot with its resolved progress label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionWithTag {
    pub ws_section_id: i64,
    pub name: Option<String>,
    pub ws_project_id: i64,
    pub created_at: String,
    pub tag: Option<String>,
    pub band: Option<ProgressBand>,
}

/// Sections of one project with progress labels
#[derive(Debug, Clone, Serialize)]
pub struct ProjectSectionsResponse {
    pub ws_project_id: i64,
    pub project_name: Option<String>,
    pub sections: Vec<SectionWithTag>,
}

/// Attach the resolved progress label to each section
pub fn sections_with_progress(
    sections: Vec<RawSnapshot>,
    resolver: &TagResolver,
) -> Vec<SectionWithTag> {
    sections
        .into_iter()
        .map(|section| {
            let tag = resolver.resolve(section.tags.as_ref()).map(|t| t.title);
            let band = ProgressBand::classify(tag.as_deref());
            SectionWithTag {
                ws_section_id: section.ws_section_id,
                name: section.name,
                ws_project_id: section.ws_project_id,
                created_at: section.created_at,
                tag,
                band,
            }
        })
        .collect()
}

/// Keep projects where at least one section carries a progress tag other than `"0%"`
///
/// Projects nobody has started reporting on stay out of the project list.
pub fn projects_with_progress(
    projects: Vec<ProjectRecord>,
    sections: &[RawSnapshot],
    resolver: &TagResolver,
) -> Vec<ProjectRecord> {
    let started: HashSet<i64> = sections
        .iter()
        .filter(|s| {
            resolver
                .resolve(s.tags.as_ref())
                .is_some_and(|tag| tag.title != "0%")
        })
        .map(|s| s.ws_project_id)
        .collect();

    projects
        .into_iter()
        .filter(|p| started.contains(&p.ws_project_id))
        .collect()
}

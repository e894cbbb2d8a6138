//! Integration tests for pdyn-api endpoints
//!
//! Each test seeds a temporary database, reopens it read-only the way the
//! binary does, and drives the router with `oneshot`.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use pdyn_api::{build_router, AppState};
use pdyn_common::db::{connect_readonly, init_database, insert_project, insert_section};
use pdyn_common::projects::{ProjectRecord, ProjectStatus};
use pdyn_common::resolver::TagMap;
use pdyn_common::time::reporting_offset;
use pdyn_common::{RawSnapshot, TagResolver, TimelineReconstructor};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

fn project(ws_project_id: i64, name: &str) -> ProjectRecord {
    ProjectRecord {
        id: format!("uuid-{}", ws_project_id),
        ws_project_id,
        name: Some(name.to_string()),
        user_to: None,
        status: Some(ProjectStatus::Active),
    }
}

fn section(
    id: i64,
    project_id: i64,
    name: &str,
    created_at: &str,
    tags: &[(&str, &str)],
) -> RawSnapshot {
    let map: TagMap = tags
        .iter()
        .map(|(id, title)| (id.to_string(), json!(title)))
        .collect();
    RawSnapshot {
        ws_section_id: id,
        name: Some(name.to_string()),
        ws_project_id: project_id,
        created_at: created_at.to_string(),
        tags: Some(map),
    }
}

/// Test helper: seed a database and build state over a read-only pool
///
/// Project 10 has reported progress, project 20 only has 0% sections.
async fn seeded_state() -> (TempDir, AppState) {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("pdyn.db");

    let pool = init_database(&db_path).await.expect("init database");
    insert_project(&pool, &project(10, "Tower A")).await.unwrap();
    insert_project(&pool, &project(20, "Depot")).await.unwrap();

    for s in [
        section(1, 10, "Foundation", "2024-12-20T09:00:00Z", &[("200867", "0%")]),
        section(1, 10, "Foundation", "2025-01-01T09:00:00Z", &[("200870", "10%")]),
        section(2, 10, "Walls", "2025-01-08T09:00:00Z", &[("500001", "crew B")]),
        section(1, 10, "Foundation", "2025-01-15T09:00:00Z", &[("200882", "30%"), ("200879", "20%")]),
        section(3, 10, "#service", "2025-01-15T10:00:00Z", &[("200873", "100%")]),
        section(4, 20, "Yard", "2025-01-02T09:00:00Z", &[("200867", "0%")]),
    ] {
        insert_section(&pool, &s).await.unwrap();
    }
    pool.close().await;

    let readonly = connect_readonly(&db_path).await.expect("read-only pool");
    let state = AppState::new(
        readonly,
        TagResolver::default(),
        TimelineReconstructor::new(reporting_offset(0).unwrap()),
    );
    (dir, state)
}

async fn setup_app() -> (TempDir, axum::Router) {
    let (dir, state) = seeded_state().await;
    (dir, build_router(state))
}

/// Test helper: issue a GET and return status and JSON body
async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let body = serde_json::from_slice(&bytes).expect("Should parse JSON");
    (status, body)
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (_dir, app) = setup_app().await;
    let (status, body) = get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "pdyn-api");
    assert!(body["version"].is_string());
}

// =============================================================================
// Projects
// =============================================================================

#[tokio::test]
async fn test_project_list_hides_unstarted_projects() {
    let (_dir, app) = setup_app().await;
    let (status, body) = get_json(app, "/api/projects").await;

    assert_eq!(status, StatusCode::OK);
    let projects = body.as_array().unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["ws_project_id"], 10);
    assert_eq!(projects[0]["name"], "Tower A");
    assert_eq!(projects[0]["status"], "active");
}

#[tokio::test]
async fn test_project_detail_includes_sections() {
    let (_dir, app) = setup_app().await;
    let (status, body) = get_json(app, "/api/projects/20").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Depot");
    assert_eq!(body["sections"].as_array().unwrap().len(), 1);
    assert_eq!(body["sections"][0]["tags"]["200867"], "0%");
}

#[tokio::test]
async fn test_project_detail_bad_id() {
    let (_dir, app) = setup_app().await;
    let (status, body) = get_json(app, "/api/projects/abc").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("abc"));
}

#[tokio::test]
async fn test_project_detail_not_found() {
    let (_dir, app) = setup_app().await;
    let (status, body) = get_json(app, "/api/projects/999").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["detail"].is_string());
}

// =============================================================================
// Sections and tags
// =============================================================================

#[tokio::test]
async fn test_sections_all_and_filtered() {
    let (_dir, app) = setup_app().await;
    let (status, body) = get_json(app.clone(), "/api/sections").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 6);

    let (status, body) = get_json(app.clone(), "/api/sections?ws_project_id=20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Yard");

    let (status, _) = get_json(app, "/api/sections?ws_project_id=x1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_project_tags_resolved() {
    let (_dir, app) = setup_app().await;
    let (status, body) = get_json(app, "/api/tags/project/10").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ws_project_id"], 10);
    assert_eq!(body["project_name"], "Tower A");

    let sections = body["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 5);
    assert_eq!(sections[0]["tag"], "0%");
    assert_eq!(sections[0]["band"], "low");
    assert_eq!(sections[2]["tag"], Value::Null);
    assert_eq!(sections[3]["tag"], "30%");
    assert_eq!(sections[4]["tag"], "100%");
    assert_eq!(sections[4]["band"], "high");
}

#[tokio::test]
async fn test_project_tags_not_found() {
    let (_dir, app) = setup_app().await;
    let (status, _) = get_json(app, "/api/tags/project/31337").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Timeline
// =============================================================================

#[tokio::test]
async fn test_timeline_reconstructed_and_trimmed() {
    let (_dir, app) = setup_app().await;
    let (status, body) = get_json(app, "/api/projects/10/timeline").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project_name"], "Tower A");

    // 20.12.2024 only has Foundation at 0% and is trimmed away
    assert_eq!(body["trimmed_leading"], 1);
    assert_eq!(body["dates"], json!(["01.01.2025", "08.01.2025", "15.01.2025"]));
    assert_eq!(body["months"], json!([{"month": "2025-01", "dates": 3}]));

    let sections = body["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 2, "#service is filtered out");
    assert_eq!(sections[0]["name"], "Foundation");
    assert_eq!(sections[0]["color"], "#40916C");
    assert_eq!(sections[0]["progress"], json!(["10%", "10%", "30%"]));
    assert_eq!(sections[1]["name"], "Walls");
    assert_eq!(sections[1]["color"], "#406987");
    assert_eq!(sections[1]["progress"], json!(["-", "0%", "0%"]));

    assert_eq!(body["average"]["name"], "Average");
    assert_eq!(body["average"]["color"], "#791B39");
    assert_eq!(body["average"]["progress"], json!(["10%", "5%", "15%"]));
}

#[tokio::test]
async fn test_timeline_without_progress_is_untrimmed() {
    let (_dir, app) = setup_app().await;
    let (status, body) = get_json(app, "/api/projects/20/timeline").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["trimmed_leading"], 0);
    assert_eq!(body["dates"], json!(["02.01.2025"]));
    assert_eq!(body["average"]["progress"], json!(["0%"]));
}

#[tokio::test]
async fn test_timeline_bad_and_missing_project() {
    let (_dir, app) = setup_app().await;
    let (status, _) = get_json(app.clone(), "/api/projects/ten/timeline").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get_json(app, "/api/projects/77/timeline").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_timeline_average_label_configured() {
    let (_dir, state) = seeded_state().await;
    let app = build_router(state.with_average_label("Среднее значение"));
    let (status, body) = get_json(app, "/api/projects/10/timeline").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["average"]["name"], "Среднее значение");
    assert_eq!(body["average"]["progress"], json!(["10%", "5%", "15%"]));
}

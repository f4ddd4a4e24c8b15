//! End-to-end API integration tests
//!
//! These tests verify the complete HTTP flows including:
//! - Team creation, update, selection and deletion
//! - Workflow editing on the current team
//! - Deployment into a project's config
//! - Write-through to the team repository

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use teamforge_api::api::{router, AppState};
use teamforge_api::config::ProjectConfig;
use teamforge_api::domain::repositories::TeamRepository;
use teamforge_api::infrastructure::repositories::InMemoryTeamRepository;
use teamforge_api::store::TeamStore;
use tower::util::ServiceExt; // for oneshot
use uuid::Uuid;

/// Setup test application over a fresh store and repository
fn setup_app() -> (Router, Arc<InMemoryTeamRepository>) {
    let repository = Arc::new(InMemoryTeamRepository::new());
    let state = AppState::new(TeamStore::new(), repository.clone());
    (router(state), repository)
}

/// Send a request and decode the JSON body (Null when empty)
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(&value).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };

    (status, json)
}

async fn create_team(app: &Router, name: &str) -> String {
    let (status, json) = send(
        app,
        "POST",
        "/api/teams",
        Some(json!({ "name": name, "description": "test team" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_str().unwrap().to_string()
}

async fn add_agent(app: &Router, agent_id: &str, x: f64) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/api/workflow/agents",
        Some(json!({ "agent_id": agent_id, "position": { "x": x, "y": x } })),
    )
    .await
}

fn agent_orders(workflow: &Value) -> Vec<(String, u64)> {
    workflow
        .as_array()
        .unwrap()
        .iter()
        .map(|node| {
            (
                node["agentId"].as_str().unwrap().to_string(),
                node["order"].as_u64().unwrap(),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup_app();

    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}

#[tokio::test]
async fn test_create_team_selects_and_persists() {
    let (app, repository) = setup_app();

    let team_id = create_team(&app, "Backend").await;

    let (status, state) = send(&app, "GET", "/api/state", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["currentTeam"]["id"], team_id.as_str());
    assert_eq!(state["currentTeam"]["chainingEnabled"], true);
    assert_eq!(state["currentTeam"]["workflow"], json!([]));
    assert_eq!(state["isLoading"], false);

    let stored = repository
        .find_by_id(team_id.parse().unwrap())
        .await
        .unwrap();
    assert!(stored.is_some(), "Team should be written through");
}

#[tokio::test]
async fn test_workflow_scenario_over_http() {
    let (app, repository) = setup_app();
    let team_id = create_team(&app, "T").await;

    for (agent, x) in [("a1", 0.0), ("a2", 10.0), ("a3", 20.0)] {
        let (status, node) = add_agent(&app, agent, x).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(node["agentId"], agent);
    }

    let (status, workflow) = send(&app, "DELETE", "/api/workflow/agents/a2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        agent_orders(&workflow),
        vec![("a1".to_string(), 1), ("a3".to_string(), 2)]
    );

    let (status, workflow) = send(
        &app,
        "PUT",
        "/api/workflow/order",
        Some(json!({ "agent_ids": ["a3", "a1"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        agent_orders(&workflow),
        vec![("a3".to_string(), 1), ("a1".to_string(), 2)]
    );

    let stored = repository
        .find_by_id(team_id.parse().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.agent_ids_in_order(), vec!["a3", "a1"]);
}

#[tokio::test]
async fn test_duplicate_agent_conflicts() {
    let (app, _) = setup_app();
    create_team(&app, "T").await;
    add_agent(&app, "a1", 0.0).await;

    let (status, body) = add_agent(&app, "a1", 50.0).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("a1"));

    let (_, workflow) = send(&app, "GET", "/api/workflow", None).await;
    assert_eq!(workflow.as_array().unwrap().len(), 1);
    assert_eq!(workflow[0]["position"]["x"], 0.0);
}

#[tokio::test]
async fn test_workflow_without_current_team() {
    let (app, _) = setup_app();

    let (status, workflow) = send(&app, "GET", "/api/workflow", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(workflow, json!([]));

    let (status, _) = add_agent(&app, "a1", 0.0).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/api/workflow", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_position_and_clear() {
    let (app, _) = setup_app();
    create_team(&app, "T").await;
    add_agent(&app, "a1", 0.0).await;
    add_agent(&app, "a2", 5.0).await;

    let (status, _) = send(
        &app,
        "PUT",
        "/api/workflow/agents/a2/position",
        Some(json!({ "x": 300.0, "y": 12.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, workflow) = send(&app, "GET", "/api/workflow", None).await;
    assert_eq!(workflow[1]["position"], json!({ "x": 300.0, "y": 12.5 }));
    assert_eq!(workflow[1]["order"], 2);

    let (status, _) = send(
        &app,
        "PUT",
        "/api/workflow/agents/ghost/position",
        Some(json!({ "x": 1.0, "y": 1.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/api/workflow", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, workflow) = send(&app, "GET", "/api/workflow", None).await;
    assert_eq!(workflow, json!([]));
}

#[tokio::test]
async fn test_strict_reorder_rejects_partial_list() {
    let (app, _) = setup_app();
    create_team(&app, "T").await;
    add_agent(&app, "a1", 0.0).await;
    add_agent(&app, "a2", 0.0).await;

    let (status, _) = send(
        &app,
        "PUT",
        "/api/workflow/order",
        Some(json!({ "agent_ids": ["a2"], "strict": true })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, workflow) = send(&app, "GET", "/api/workflow", None).await;
    assert_eq!(
        agent_orders(&workflow),
        vec![("a1".to_string(), 1), ("a2".to_string(), 2)]
    );
}

#[tokio::test]
async fn test_update_and_delete_team() {
    let (app, repository) = setup_app();
    let first = create_team(&app, "first").await;
    let second = create_team(&app, "second").await;

    let (status, team) = send(
        &app,
        "PATCH",
        &format!("/api/teams/{}", first),
        Some(json!({ "name": "renamed", "chainingEnabled": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(team["name"], "renamed");
    assert_eq!(team["chainingEnabled"], false);
    assert_eq!(team["description"], "test team");

    let (status, _) = send(&app, "DELETE", &format!("/api/teams/{}", first), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, state) = send(&app, "GET", "/api/state", None).await;
    assert_eq!(state["teams"].as_array().unwrap().len(), 1);
    assert_eq!(state["currentTeam"]["id"], second.as_str());
    assert_eq!(repository.find_all().await.unwrap().len(), 1);

    let (status, _) = send(&app, "GET", &format!("/api/teams/{}", first), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/teams/{}", Uuid::new_v4()),
        Some(json!({ "name": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_select_current_team_and_loading_flag() {
    let (app, _) = setup_app();
    let first = create_team(&app, "first").await;
    create_team(&app, "second").await;

    let (status, state) = send(
        &app,
        "PUT",
        "/api/current-team",
        Some(json!({ "team_id": first })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["currentTeam"]["name"], "first");

    let (status, _) = send(
        &app,
        "PUT",
        "/api/current-team",
        Some(json!({ "team_id": Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, state) = send(
        &app,
        "PUT",
        "/api/current-team",
        Some(json!({ "team_id": null })),
    )
    .await;
    assert!(state["currentTeam"].is_null());

    let (_, state) = send(
        &app,
        "PUT",
        "/api/loading",
        Some(json!({ "is_loading": true })),
    )
    .await;
    assert_eq!(state["isLoading"], true);
}

#[tokio::test]
async fn test_deploy_team_writes_active_agents() {
    let (app, _) = setup_app();
    let project = tempfile::tempdir().unwrap();
    ProjectConfig::default_for("shop", "Frontend", project.path().to_string_lossy(), vec![])
        .save(project.path())
        .await
        .unwrap();

    let team_id = create_team(&app, "Ship").await;
    add_agent(&app, "planner", 0.0).await;
    add_agent(&app, "coder", 0.0).await;
    send(
        &app,
        "PUT",
        "/api/workflow/order",
        Some(json!({ "agent_ids": ["coder", "planner"] })),
    )
    .await;

    let (status, deployed) = send(
        &app,
        "POST",
        &format!("/api/teams/{}/deploy", team_id),
        Some(json!({ "project_path": project.path() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deployed["id"], team_id.as_str());
    assert_eq!(deployed["name"], "Ship");
    assert!(deployed["deployedAt"].is_string());

    let config = ProjectConfig::load(project.path()).await.unwrap();
    assert_eq!(config.active_agents, vec!["coder", "planner"]);

    let (_, state) = send(&app, "GET", "/api/state", None).await;
    assert_eq!(state["deployedTeam"]["id"], team_id.as_str());

    let (status, _) = send(&app, "DELETE", "/api/deployment", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, state) = send(&app, "GET", "/api/state", None).await;
    assert!(state["deployedTeam"].is_null());
}

#[tokio::test]
async fn test_deploy_into_unconfigured_project_fails() {
    let (app, _) = setup_app();
    let project = tempfile::tempdir().unwrap();
    let team_id = create_team(&app, "Ship").await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/teams/{}/deploy", team_id),
        Some(json!({ "project_path": project.path() })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, state) = send(&app, "GET", "/api/state", None).await;
    assert!(state["deployedTeam"].is_null());
    assert!(!project.path().join(".teamforge").exists());
}

#[tokio::test]
async fn test_deploy_without_body() {
    let (app, _) = setup_app();
    let team_id = create_team(&app, "Ship").await;

    let (status, deployed) = send(
        &app,
        "POST",
        &format!("/api/teams/{}/deploy", team_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deployed["id"], team_id.as_str());

    let (_, state) = send(&app, "GET", "/api/state", None).await;
    assert_eq!(state["deployedTeam"]["name"], "Ship");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/teams/{}/deploy", Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_project_config_lifecycle() {
    let (app, _) = setup_app();
    let project = tempfile::tempdir().unwrap();
    let path = project.path().to_string_lossy().into_owned();
    let exists_uri = format!("/api/project/exists?path={}", path);
    let config_uri = format!("/api/project/config?path={}", path);

    let (_, exists) = send(&app, "GET", &exists_uri, None).await;
    assert_eq!(exists["exists"], false);

    let (status, init) = send(
        &app,
        "POST",
        "/api/project/init",
        Some(json!({ "path": path })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(init["agents_dir"].as_str().unwrap().ends_with("agents"));
    assert_eq!(init["config_created"], true);

    let (_, exists) = send(&app, "GET", &exists_uri, None).await;
    assert_eq!(exists["exists"], true);
    let (_, seeded) = send(&app, "GET", &config_uri, None).await;
    assert_eq!(seeded["project"]["project_type"], "Library");
    assert_eq!(seeded["active_agents"], json!([]));

    let (_, config) = send(
        &app,
        "POST",
        "/api/project/config/default",
        Some(json!({ "name": "shop", "project_type": "Library", "path": path })),
    )
    .await;
    assert_eq!(config["version"], "1.0.0");

    let (_, warnings) = send(
        &app,
        "POST",
        "/api/project/config/validate",
        Some(config.clone()),
    )
    .await;
    assert_eq!(warnings, json!(["No active agents configured"]));

    let (status, _) = send(
        &app,
        "PUT",
        "/api/project/config",
        Some(json!({ "path": path, "config": config })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, exists) = send(&app, "GET", &exists_uri, None).await;
    assert_eq!(exists["exists"], true);

    let (status, loaded) = send(&app, "GET", &config_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loaded["project"]["name"], "shop");

    let (_, init) = send(
        &app,
        "POST",
        "/api/project/init",
        Some(json!({ "path": path })),
    )
    .await;
    assert_eq!(init["config_created"], false);
    let (_, loaded) = send(&app, "GET", &config_uri, None).await;
    assert_eq!(loaded["project"]["name"], "shop");
}

#[tokio::test]
async fn test_analyze_project() {
    let (app, _) = setup_app();
    let project = tempfile::tempdir().unwrap();
    std::fs::write(
        project.path().join("package.json"),
        r#"{ "dependencies": { "vue": "^3" }, "devDependencies": { "cypress": "^13" } }"#,
    )
    .unwrap();
    std::fs::create_dir_all(project.path().join("src")).unwrap();
    std::fs::write(project.path().join("src/App.vue"), "").unwrap();
    let path = project.path().to_string_lossy().into_owned();

    let (status, analysis) = send(
        &app,
        "GET",
        &format!("/api/project/analyze?path={}", path),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(analysis["project_type"], "Frontend");
    assert_eq!(analysis["detected_technologies"], json!(["cypress", "vue"]));
    assert_eq!(analysis["file_counts"]["vue"], 1);
    assert_eq!(analysis["total_files"], 2);
    assert_eq!(
        analysis["suggested_agents"],
        json!([
            "code-reviewer",
            "e2e-tester",
            "frontend-developer",
            "test-engineer",
            "ux-designer"
        ])
    );

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/project/analyze?path={}/missing", path),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_workflow_edit_persists_the_team_it_edited() {
    let repository = Arc::new(InMemoryTeamRepository::new());
    let state = AppState::new(TeamStore::new(), repository.clone());
    let app = router(state.clone());

    let first = create_team(&app, "First").await;
    let second = create_team(&app, "Second").await;
    send(
        &app,
        "PUT",
        "/api/current-team",
        Some(json!({ "team_id": first })),
    )
    .await;

    // Queue an add on the first team, then a selection change behind it
    let guard = state.store.lock().await;
    let add = tokio::spawn({
        let app = app.clone();
        async move { add_agent(&app, "a1", 0.0).await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    let select = tokio::spawn({
        let app = app.clone();
        let second = second.clone();
        async move {
            send(
                &app,
                "PUT",
                "/api/current-team",
                Some(json!({ "team_id": second })),
            )
            .await
        }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    drop(guard);

    let (status, _) = add.await.unwrap();
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = select.await.unwrap();
    assert_eq!(status, StatusCode::OK);

    let stored_first = repository
        .find_by_id(first.parse().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored_first.agent_ids_in_order(), vec!["a1"]);

    let stored_second = repository
        .find_by_id(second.parse().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert!(stored_second.workflow().is_empty());
}

#[tokio::test]
async fn test_state_hydrates_from_repository() {
    let repository = Arc::new(InMemoryTeamRepository::new());
    let mut seed = TeamStore::new();
    let team = seed.create_team("persisted", "");
    repository.save(&team).await.unwrap();

    let state = AppState::load(TeamStore::new(), repository).await.unwrap();
    let app = router(state);

    let (_, teams) = send(&app, "GET", "/api/teams", None).await;
    assert_eq!(teams.as_array().unwrap().len(), 1);
    assert_eq!(teams[0]["name"], "persisted");

    let (_, state) = send(&app, "GET", "/api/state", None).await;
    assert!(state["currentTeam"].is_null());
}

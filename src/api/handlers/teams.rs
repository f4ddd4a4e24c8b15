use std::path::PathBuf;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::state::AppState;
use crate::config::ProjectConfig;
use crate::domain::repositories::RepositoryError;
use crate::domain::team::{DeployedTeam, Team, TeamPatch};
use crate::store::StoreError;

/// Request body for creating a team
#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Request body for deploying a team
#[derive(Debug, Default, Deserialize)]
pub struct DeployTeamRequest {
    /// Project whose `.teamforge/config.json` receives the workflow's agents
    #[serde(default)]
    pub project_path: Option<PathBuf>,
}

/// Create a new team and select it
///
/// POST /api/teams
pub async fn create_team(
    State(state): State<AppState>,
    Json(req): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<Team>), ApiError> {
    let mut store = state.store.lock().await;
    let team = store.create_team(req.name, req.description);
    state.persist(&team).await?;

    Ok((StatusCode::CREATED, Json(team)))
}

/// List all teams in insertion order
///
/// GET /api/teams
pub async fn list_teams(State(state): State<AppState>) -> Json<Vec<Team>> {
    Json(state.store.lock().await.teams().to_vec())
}

/// Get a team by ID
///
/// GET /api/teams/:id
pub async fn get_team(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Team>, ApiError> {
    let store = state.store.lock().await;
    let team = store
        .get_team_by_id(id)
        .cloned()
        .ok_or_else(|| ApiError::not_found(format!("Team not found: {}", id)))?;

    Ok(Json(team))
}

/// Update name, description or chaining flag
///
/// PATCH /api/teams/:id
pub async fn update_team(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<TeamPatch>,
) -> Result<Json<Team>, ApiError> {
    let mut store = state.store.lock().await;
    let team = store.update_team(id, patch)?;
    state.persist(&team).await?;

    Ok(Json(team))
}

/// Delete a team
///
/// DELETE /api/teams/:id
pub async fn delete_team(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.lock().await;
    store.delete_team(id)?;

    match state.repository.delete(id).await {
        Ok(()) | Err(RepositoryError::TeamNotFound(_)) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(ApiError::from(e)),
    }
}

/// Record a team as deployed
///
/// When `project_path` is given, the team's agents are written, in
/// execution order, to that project's `active_agents` first. A missing or
/// unwritable project config fails the request and leaves the deployed
/// team unchanged. The body may be omitted entirely.
///
/// POST /api/teams/:id/deploy
pub async fn deploy_team(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<DeployTeamRequest>>,
) -> Result<Json<DeployedTeam>, ApiError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();

    let mut store = state.store.lock().await;
    let agent_ids = store
        .get_team_by_id(id)
        .map(Team::agent_ids_in_order)
        .ok_or(StoreError::TeamNotFound(id))?;

    if let Some(project_path) = req.project_path {
        let mut config = ProjectConfig::load(&project_path).await?;
        config.set_active_agents(agent_ids);
        config.save(&project_path).await?;
        tracing::info!(
            team_id = %id,
            project = %project_path.display(),
            agents = config.active_agents.len(),
            "deployed team to project"
        );
    }

    Ok(Json(store.deploy_team(id)?))
}

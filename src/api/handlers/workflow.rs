use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::api::errors::ApiError;
use crate::api::state::AppState;
use crate::domain::team::{Position, WorkflowNode};

/// Request body for placing an agent on the canvas
#[derive(Debug, Deserialize)]
pub struct AddAgentRequest {
    pub agent_id: String,
    #[serde(default)]
    pub position: Position,
}

/// Request body for reordering the workflow
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub agent_ids: Vec<String>,
    /// Reject lists that are not a permutation of the workflow
    #[serde(default)]
    pub strict: bool,
}

/// Current team's workflow in execution order
///
/// GET /api/workflow
pub async fn get_workflow(State(state): State<AppState>) -> Json<Vec<WorkflowNode>> {
    Json(state.store.lock().await.workflow_agents())
}

/// POST /api/workflow/agents
pub async fn add_agent(
    State(state): State<AppState>,
    Json(req): Json<AddAgentRequest>,
) -> Result<(StatusCode, Json<WorkflowNode>), ApiError> {
    let mut store = state.store.lock().await;
    let node = store.add_agent_to_workflow(req.agent_id, req.position)?;
    state.persist_current(&store).await?;

    Ok((StatusCode::CREATED, Json(node)))
}

/// DELETE /api/workflow/agents/:agent_id
pub async fn remove_agent(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<Vec<WorkflowNode>>, ApiError> {
    let mut store = state.store.lock().await;
    store.remove_agent_from_workflow(&agent_id)?;
    state.persist_current(&store).await?;

    Ok(Json(store.workflow_agents()))
}

/// PUT /api/workflow/agents/:agent_id/position
pub async fn update_position(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Json(position): Json<Position>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.lock().await;
    store.update_agent_position(&agent_id, position)?;
    state.persist_current(&store).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/workflow/order
pub async fn reorder(
    State(state): State<AppState>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<Vec<WorkflowNode>>, ApiError> {
    let mut store = state.store.lock().await;
    if req.strict {
        store.reorder_workflow_strict(&req.agent_ids)?;
    } else {
        store.reorder_workflow(&req.agent_ids)?;
    }
    state.persist_current(&store).await?;

    Ok(Json(store.workflow_agents()))
}

/// DELETE /api/workflow
pub async fn clear_workflow(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    let mut store = state.store.lock().await;
    store.clear_workflow()?;
    state.persist_current(&store).await?;

    Ok(StatusCode::NO_CONTENT)
}

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::state::AppState;
use crate::store::{StoreError, StoreState};

#[derive(Debug, Deserialize)]
pub struct SetCurrentTeamRequest {
    pub team_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SetLoadingRequest {
    pub is_loading: bool,
}

/// Full snapshot for the UI
///
/// GET /api/state
pub async fn get_state(State(state): State<AppState>) -> Json<StoreState> {
    Json(state.store.lock().await.snapshot())
}

/// Select the team to edit, or clear the selection with `null`
///
/// Unknown ids are rejected here; the store itself accepts any id.
///
/// PUT /api/current-team
pub async fn set_current_team(
    State(state): State<AppState>,
    Json(req): Json<SetCurrentTeamRequest>,
) -> Result<Json<StoreState>, ApiError> {
    let mut store = state.store.lock().await;
    if let Some(id) = req.team_id {
        if store.get_team_by_id(id).is_none() {
            return Err(StoreError::TeamNotFound(id).into());
        }
    }
    store.set_current_team(req.team_id);

    Ok(Json(store.snapshot()))
}

/// DELETE /api/deployment
pub async fn clear_deployment(State(state): State<AppState>) -> StatusCode {
    state.store.lock().await.set_deployed_team(None);
    StatusCode::NO_CONTENT
}

/// PUT /api/loading
pub async fn set_loading(
    State(state): State<AppState>,
    Json(req): Json<SetLoadingRequest>,
) -> Json<StoreState> {
    let mut store = state.store.lock().await;
    store.set_is_loading(req.is_loading);
    Json(store.snapshot())
}

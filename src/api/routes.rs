use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::handlers::{health, project, store_state, teams, workflow};
use crate::api::state::AppState;

/// Builds the application router over `state`
pub fn router(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Store snapshot and setters
        .route("/api/state", get(store_state::get_state))
        .route("/api/current-team", put(store_state::set_current_team))
        .route("/api/deployment", delete(store_state::clear_deployment))
        .route("/api/loading", put(store_state::set_loading))
        // Team routes
        .route("/api/teams", post(teams::create_team).get(teams::list_teams))
        .route(
            "/api/teams/:id",
            get(teams::get_team)
                .patch(teams::update_team)
                .delete(teams::delete_team),
        )
        .route("/api/teams/:id/deploy", post(teams::deploy_team))
        // Workflow routes (current team)
        .route(
            "/api/workflow",
            get(workflow::get_workflow).delete(workflow::clear_workflow),
        )
        .route("/api/workflow/agents", post(workflow::add_agent))
        .route("/api/workflow/agents/:agent_id", delete(workflow::remove_agent))
        .route(
            "/api/workflow/agents/:agent_id/position",
            put(workflow::update_position),
        )
        .route("/api/workflow/order", put(workflow::reorder))
        // Project config routes
        .route(
            "/api/project/config",
            get(project::get_config).put(project::save_config),
        )
        .route("/api/project/config/default", post(project::default_config))
        .route("/api/project/config/validate", post(project::validate_config))
        .route("/api/project/exists", get(project::config_exists))
        .route("/api/project/init", post(project::init_project))
        .route("/api/project/analyze", get(project::analyze))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Shared state
        .with_state(state)
}

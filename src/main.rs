use std::sync::Arc;

use teamforge_api::api::{self, AppState};
use teamforge_api::config::ServerConfig;
use teamforge_api::domain::repositories::TeamRepository;
use teamforge_api::infrastructure::repositories::{
    InMemoryTeamRepository, JsonFileTeamRepository,
};
use teamforge_api::store::TeamStore;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = ServerConfig::from_env().expect("Invalid server configuration");

    let repository: Arc<dyn TeamRepository> = match &config.data_dir {
        Some(dir) => {
            let repo = JsonFileTeamRepository::new(dir);
            tracing::info!("Persisting teams to {}", repo.path().display());
            Arc::new(repo)
        }
        None => {
            tracing::warn!("TEAMFORGE_DATA_DIR not set, teams are kept in memory only");
            Arc::new(InMemoryTeamRepository::new())
        }
    };

    let mut store = TeamStore::new();
    store.subscribe(|state, event| {
        tracing::debug!(teams = state.teams.len(), ?event, "store changed");
    });

    let state = AppState::load(store, repository)
        .await
        .expect("Failed to load teams from storage");

    let app = api::router(state);

    // Start server
    tracing::info!("Server listening on {}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .await
        .expect("Server failed");
}

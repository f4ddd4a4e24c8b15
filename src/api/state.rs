use std::sync::Arc;

use tokio::sync::Mutex;

use crate::api::errors::ApiError;
use crate::domain::repositories::{RepositoryResult, TeamRepository};
use crate::domain::team::Team;
use crate::store::TeamStore;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<TeamStore>>,
    pub repository: Arc<dyn TeamRepository>,
}

impl AppState {
    pub fn new(store: TeamStore, repository: Arc<dyn TeamRepository>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            repository,
        }
    }

    /// Builds the state with the store hydrated from `repository`
    pub async fn load(
        mut store: TeamStore,
        repository: Arc<dyn TeamRepository>,
    ) -> RepositoryResult<Self> {
        let teams = repository.find_all().await?;
        tracing::info!("Loaded {} teams from storage", teams.len());
        store.set_teams(teams);

        Ok(Self::new(store, repository))
    }

    /// Writes `team` through to the repository
    pub async fn persist(&self, team: &Team) -> Result<(), ApiError> {
        self.repository.save(team).await.map_err(|e| {
            tracing::warn!(team_id = %team.id(), error = %e, "failed to persist team");
            ApiError::from(e)
        })
    }

    /// Persists the current team of a still-locked store
    ///
    /// Callers keep the store guard across the write so repository saves
    /// land in the same order as the store mutations they follow.
    pub async fn persist_current(&self, store: &TeamStore) -> Result<(), ApiError> {
        match store.current_team() {
            Some(team) => self.persist(team).await,
            None => Ok(()),
        }
    }
}

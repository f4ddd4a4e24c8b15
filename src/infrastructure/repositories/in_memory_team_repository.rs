use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::repositories::{RepositoryError, RepositoryResult, TeamRepository};
use crate::domain::team::Team;

/// Volatile implementation of TeamRepository
///
/// Used when no data directory is configured; everything is lost on exit.
#[derive(Debug, Default)]
pub struct InMemoryTeamRepository {
    teams: RwLock<Vec<Team>>,
}

impl InMemoryTeamRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TeamRepository for InMemoryTeamRepository {
    async fn save(&self, team: &Team) -> RepositoryResult<()> {
        let mut teams = self.teams.write().await;
        match teams.iter_mut().find(|stored| stored.id() == team.id()) {
            Some(stored) => *stored = team.clone(),
            None => teams.push(team.clone()),
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Team>> {
        let teams = self.teams.read().await;
        Ok(teams.iter().find(|team| team.id() == id).cloned())
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Team>> {
        Ok(self.teams.read().await.clone())
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let mut teams = self.teams.write().await;
        let before = teams.len();
        teams.retain(|team| team.id() != id);

        if teams.len() == before {
            return Err(RepositoryError::TeamNotFound(id));
        }
        Ok(())
    }
}

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::repositories::{RepositoryError, RepositoryResult, TeamRepository};
use crate::domain::team::Team;

const TEAMS_FILE_NAME: &str = "teams.json";

/// File-backed implementation of TeamRepository
///
/// Keeps every team in a single pretty-printed JSON array at
/// `<data_dir>/teams.json`. Writes go to a sibling temp file that is then
/// renamed over the original, so a crash never leaves a half-written file.
#[derive(Debug)]
pub struct JsonFileTeamRepository {
    path: PathBuf,
    // serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl JsonFileTeamRepository {
    /// Creates a repository storing teams under `data_dir`
    ///
    /// The directory is created on first write.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(TEAMS_FILE_NAME),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> RepositoryResult<Vec<Team>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, teams: &[Team]) -> RepositoryResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_vec_pretty(teams)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, data).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl TeamRepository for JsonFileTeamRepository {
    async fn save(&self, team: &Team) -> RepositoryResult<()> {
        let _guard = self.lock.lock().await;
        let mut teams = self.read_all().await?;
        match teams.iter_mut().find(|stored| stored.id() == team.id()) {
            Some(stored) => *stored = team.clone(),
            None => teams.push(team.clone()),
        }
        self.write_all(&teams).await?;

        tracing::debug!(team_id = %team.id(), path = %self.path.display(), "team saved");
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Team>> {
        let _guard = self.lock.lock().await;
        let teams = self.read_all().await?;
        Ok(teams.into_iter().find(|team| team.id() == id))
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Team>> {
        let _guard = self.lock.lock().await;
        self.read_all().await
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<()> {
        let _guard = self.lock.lock().await;
        let mut teams = self.read_all().await?;
        let before = teams.len();
        teams.retain(|team| team.id() != id);

        if teams.len() == before {
            return Err(RepositoryError::TeamNotFound(id));
        }
        self.write_all(&teams).await
    }
}

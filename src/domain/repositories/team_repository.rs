use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::team::Team;

/// Failures of a team persistence backend
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Team not found: {0}")]
    TeamNotFound(Uuid),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage format error: {0}")]
    Format(#[from] serde_json::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository trait for Team aggregate
///
/// Defines the contract for persisting and retrieving teams.
/// The in-memory store is the source of truth while the process runs;
/// a repository only snapshots it.
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Save a team (insert or update)
    async fn save(&self, team: &Team) -> RepositoryResult<()>;

    /// Find a team by its ID
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Team>>;

    /// All stored teams, in the order they were first saved
    async fn find_all(&self) -> RepositoryResult<Vec<Team>>;

    /// Delete a team by ID
    async fn delete(&self, id: Uuid) -> RepositoryResult<()>;
}

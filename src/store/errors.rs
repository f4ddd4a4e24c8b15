use thiserror::Error;
use uuid::Uuid;

use crate::domain::team::TeamError;

/// Reasons a store operation left the state untouched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Team not found: {0}")]
    TeamNotFound(Uuid),

    #[error("No current team selected")]
    NoCurrentTeam,

    #[error(transparent)]
    Team(#[from] TeamError),
}

pub type StoreResult<T> = Result<T, StoreError>;

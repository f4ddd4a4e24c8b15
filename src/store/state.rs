use serde::{Deserialize, Serialize};

use crate::domain::team::{DeployedTeam, Team};

/// Point-in-time view of the whole store
///
/// `current_team` is resolved from `teams` when the snapshot is taken, so
/// the two can never disagree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState {
    pub teams: Vec<Team>,
    pub current_team: Option<Team>,
    pub deployed_team: Option<DeployedTeam>,
    pub is_loading: bool,
}

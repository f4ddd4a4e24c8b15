use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::value_objects::Position;

/// Domain events that occur within the Team aggregate
///
/// Emitted by every successful team mutation and forwarded by the store to
/// its subscribers.
///
/// # Example
/// ```
/// use teamforge_api::domain::team::events::TeamEvent;
/// use uuid::Uuid;
///
/// let team_id = Uuid::new_v4();
/// let event = TeamEvent::WorkflowCleared { team_id };
/// assert_eq!(event.team_id(), team_id);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TeamEvent {
    /// Fired when a team is created
    Created {
        team_id: Uuid,
        name: String,
    },
    /// Fired when name, description or chaining flag change
    Updated {
        team_id: Uuid,
    },
    /// Fired when a team is removed from the store
    Deleted {
        team_id: Uuid,
    },
    /// Fired when an agent is appended to the workflow
    AgentAdded {
        team_id: Uuid,
        agent_id: String,
        order: u32,
    },
    /// Fired when an agent leaves the workflow and the rest is renumbered
    AgentRemoved {
        team_id: Uuid,
        agent_id: String,
    },
    /// Fired when a node is dragged on the canvas
    AgentMoved {
        team_id: Uuid,
        agent_id: String,
        position: Position,
    },
    /// Fired when execution order is reassigned
    WorkflowReordered {
        team_id: Uuid,
        agent_ids: Vec<String>,
    },
    /// Fired when every node is removed from the workflow
    WorkflowCleared {
        team_id: Uuid,
    },
}

impl TeamEvent {
    /// Returns the team_id for this event
    pub fn team_id(&self) -> Uuid {
        match self {
            TeamEvent::Created { team_id, .. } => *team_id,
            TeamEvent::Updated { team_id } => *team_id,
            TeamEvent::Deleted { team_id } => *team_id,
            TeamEvent::AgentAdded { team_id, .. } => *team_id,
            TeamEvent::AgentRemoved { team_id, .. } => *team_id,
            TeamEvent::AgentMoved { team_id, .. } => *team_id,
            TeamEvent::WorkflowReordered { team_id, .. } => *team_id,
            TeamEvent::WorkflowCleared { team_id } => *team_id,
        }
    }
}

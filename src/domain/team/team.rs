use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::TeamError;
use super::events::TeamEvent;
use super::value_objects::{Position, TeamPatch, WorkflowNode};

/// Team aggregate root
///
/// A named, ordered workflow of agents. Storage order of `workflow` is not
/// execution order; execution order is carried by each node's `order`.
///
/// # Invariants
/// - An agent appears at most once in the workflow
/// - Orders are 1-based and contiguous after add, remove and strict reorder
/// - `updated_at` moves forward on every mutation
///
/// Every mutation takes the current time from the caller.
///
/// # Example
/// ```
/// use chrono::Utc;
/// use teamforge_api::domain::team::{Position, Team};
///
/// let (mut team, events) = Team::new("Review squad", "PR pipeline", Utc::now());
/// team.add_agent("code-reviewer", Position::new(0.0, 0.0), Utc::now())
///     .expect("new agent");
///
/// assert!(team.chaining_enabled());
/// assert_eq!(team.workflow()[0].order, 1);
/// assert_eq!(events.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    id: Uuid,
    name: String,
    description: String,
    chaining_enabled: bool,
    workflow: Vec<WorkflowNode>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Team {
    /// Creates a new Team aggregate
    ///
    /// # Business Rules Enforced
    /// - Id is a fresh v4 UUID
    /// - Chaining is enabled and the workflow is empty
    /// - `created_at` and `updated_at` are both `now`
    /// - Team generates a Created event
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> (Self, Vec<TeamEvent>) {
        let team = Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            chaining_enabled: true,
            workflow: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let events = vec![TeamEvent::Created {
            team_id: team.id,
            name: team.name.clone(),
        }];

        (team, events)
    }

    /// Merges the set fields of `patch` into the team
    ///
    /// An empty patch still refreshes `updated_at`.
    pub fn apply(&mut self, patch: TeamPatch, now: DateTime<Utc>) -> TeamEvent {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(enabled) = patch.chaining_enabled {
            self.chaining_enabled = enabled;
        }
        self.touch(now);

        TeamEvent::Updated { team_id: self.id }
    }

    /// Appends an agent after the highest order currently in the workflow
    ///
    /// # Returns
    /// * `Ok(TeamEvent)` - AgentAdded event carrying the assigned order
    /// * `Err(TeamError::AgentAlreadyInWorkflow)` - Agent is already placed
    pub fn add_agent(
        &mut self,
        agent_id: impl Into<String>,
        position: Position,
        now: DateTime<Utc>,
    ) -> Result<TeamEvent, TeamError> {
        let agent_id = agent_id.into();
        if self.contains_agent(&agent_id) {
            return Err(TeamError::AgentAlreadyInWorkflow(agent_id));
        }

        let order = self.max_order() + 1;
        self.workflow.push(WorkflowNode {
            agent_id: agent_id.clone(),
            position,
            order,
        });
        self.touch(now);

        Ok(TeamEvent::AgentAdded {
            team_id: self.id,
            agent_id,
            order,
        })
    }

    /// Removes an agent and renumbers the remaining nodes `1..N`
    ///
    /// Renumbering follows the storage sequence left after filtering, not
    /// the previous order values.
    pub fn remove_agent(
        &mut self,
        agent_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(WorkflowNode, TeamEvent), TeamError> {
        let index = self
            .workflow
            .iter()
            .position(|node| node.agent_id == agent_id)
            .ok_or_else(|| TeamError::AgentNotInWorkflow(agent_id.to_string()))?;

        let removed = self.workflow.remove(index);
        for (index, node) in self.workflow.iter_mut().enumerate() {
            node.order = index as u32 + 1;
        }
        self.touch(now);

        Ok((
            removed,
            TeamEvent::AgentRemoved {
                team_id: self.id,
                agent_id: agent_id.to_string(),
            },
        ))
    }

    /// Replaces the canvas position of a node, leaving its order alone
    pub fn move_agent(
        &mut self,
        agent_id: &str,
        position: Position,
        now: DateTime<Utc>,
    ) -> Result<TeamEvent, TeamError> {
        let node = self
            .workflow
            .iter_mut()
            .find(|node| node.agent_id == agent_id)
            .ok_or_else(|| TeamError::AgentNotInWorkflow(agent_id.to_string()))?;

        node.position = position;
        self.touch(now);

        Ok(TeamEvent::AgentMoved {
            team_id: self.id,
            agent_id: agent_id.to_string(),
            position,
        })
    }

    /// Assigns `order = index + 1` to every agent named in `agent_ids`
    ///
    /// Agents missing from the list keep their current order, so a partial
    /// list can leave duplicate or non-contiguous orders behind. A repeated
    /// id takes the index of its first occurrence. Use
    /// [`Team::reorder_strict`] when the list must cover the workflow.
    pub fn reorder(&mut self, agent_ids: &[String], now: DateTime<Utc>) -> TeamEvent {
        for node in &mut self.workflow {
            if let Some(index) = agent_ids.iter().position(|id| *id == node.agent_id) {
                node.order = index as u32 + 1;
            }
        }
        self.touch(now);

        TeamEvent::WorkflowReordered {
            team_id: self.id,
            agent_ids: agent_ids.to_vec(),
        }
    }

    /// Like [`Team::reorder`], but `agent_ids` must be a permutation of the
    /// workflow's agents
    ///
    /// # Returns
    /// * `Err(TeamError::ReorderMismatch)` - On a missing, unknown or
    ///   repeated id; the workflow is untouched
    pub fn reorder_strict(
        &mut self,
        agent_ids: &[String],
        now: DateTime<Utc>,
    ) -> Result<TeamEvent, TeamError> {
        let mut seen = HashSet::with_capacity(agent_ids.len());
        for id in agent_ids {
            if !seen.insert(id.as_str()) {
                return Err(TeamError::ReorderMismatch(format!("duplicate agent {}", id)));
            }
            if !self.contains_agent(id) {
                return Err(TeamError::ReorderMismatch(format!("unknown agent {}", id)));
            }
        }
        if let Some(missing) = self
            .workflow
            .iter()
            .find(|node| !seen.contains(node.agent_id.as_str()))
        {
            return Err(TeamError::ReorderMismatch(format!(
                "missing agent {}",
                missing.agent_id
            )));
        }

        Ok(self.reorder(agent_ids, now))
    }

    /// Removes every node from the workflow
    pub fn clear_workflow(&mut self, now: DateTime<Utc>) -> TeamEvent {
        self.workflow.clear();
        self.touch(now);

        TeamEvent::WorkflowCleared { team_id: self.id }
    }

    /// Returns a copy of the workflow sorted ascending by order
    ///
    /// Nodes sharing an order keep their storage sequence.
    pub fn sorted_workflow(&self) -> Vec<WorkflowNode> {
        let mut nodes = self.workflow.clone();
        nodes.sort_by_key(|node| node.order);
        nodes
    }

    /// Agent ids in execution order
    pub fn agent_ids_in_order(&self) -> Vec<String> {
        self.sorted_workflow()
            .into_iter()
            .map(|node| node.agent_id)
            .collect()
    }

    pub fn contains_agent(&self, agent_id: &str) -> bool {
        self.workflow.iter().any(|node| node.agent_id == agent_id)
    }

    fn max_order(&self) -> u32 {
        self.workflow.iter().map(|node| node.order).max().unwrap_or(0)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    // ===== Getters =====

    /// Returns the team's ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether agents hand their output to the next agent in order
    pub fn chaining_enabled(&self) -> bool {
        self.chaining_enabled
    }

    /// Workflow nodes in storage order
    pub fn workflow(&self) -> &[WorkflowNode] {
        &self.workflow
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::team::{
    DeployedTeam, Position, Team, TeamError, TeamEvent, TeamPatch, WorkflowNode,
};

use super::clock::{Clock, SystemClock};
use super::errors::{StoreError, StoreResult};
use super::state::StoreState;
use super::subscription::{StoreEvent, SubscriptionId, Subscribers};

/// In-memory container for teams and the team being edited
///
/// The store is an ordinary value: build one per window, per request
/// handler state or per test. All methods run to completion without
/// blocking; share it behind a mutex when several tasks need it.
///
/// Operations that cannot apply (no current team, unknown team, duplicate
/// or missing agent) return a [`StoreError`] and leave the state exactly as
/// it was. Subscribers hear about successful transitions only, after the
/// new state is complete.
///
/// # Example
/// ```
/// use teamforge_api::domain::team::Position;
/// use teamforge_api::store::TeamStore;
///
/// let mut store = TeamStore::new();
/// store.create_team("Review squad", "PR pipeline");
/// store.add_agent_to_workflow("planner", Position::new(0.0, 0.0)).unwrap();
/// store.add_agent_to_workflow("coder", Position::new(10.0, 10.0)).unwrap();
///
/// let order: Vec<_> = store
///     .workflow_agents()
///     .into_iter()
///     .map(|node| (node.agent_id, node.order))
///     .collect();
/// assert_eq!(order, vec![("planner".to_string(), 1), ("coder".to_string(), 2)]);
/// ```
#[derive(Debug)]
pub struct TeamStore {
    teams: Vec<Team>,
    current_team_id: Option<Uuid>,
    deployed_team: Option<DeployedTeam>,
    is_loading: bool,
    clock: Box<dyn Clock>,
    subscribers: Subscribers,
}

impl Default for TeamStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TeamStore {
    /// Creates an empty store using the wall clock
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Creates an empty store reading time from `clock`
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            teams: Vec::new(),
            current_team_id: None,
            deployed_team: None,
            is_loading: false,
            clock: Box::new(clock),
            subscribers: Subscribers::default(),
        }
    }

    // ===== Team operations =====

    /// Creates a team, appends it and makes it the current team
    pub fn create_team(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Team {
        let (team, events) = Team::new(name, description, self.clock.now());
        tracing::debug!(team_id = %team.id(), name = team.name(), "team created");

        self.teams.push(team.clone());
        self.current_team_id = Some(team.id());

        for event in events {
            self.emit(event.into());
        }
        team
    }

    /// Merges `patch` into the team with `team_id`
    ///
    /// The current team view reflects the change immediately since it is a
    /// lookup into the same collection.
    pub fn update_team(&mut self, team_id: Uuid, patch: TeamPatch) -> StoreResult<Team> {
        let now = self.clock.now();
        let team = self.team_mut(team_id)?;
        let event = team.apply(patch, now);
        let updated = team.clone();

        tracing::debug!(team_id = %team_id, "team updated");
        self.emit(event.into());
        Ok(updated)
    }

    /// Removes a team, clearing the current team if it was the one removed
    pub fn delete_team(&mut self, team_id: Uuid) -> StoreResult<Team> {
        let index = self
            .index_of(team_id)
            .ok_or(StoreError::TeamNotFound(team_id))?;
        let removed = self.teams.remove(index);

        if self.current_team_id == Some(team_id) {
            self.current_team_id = None;
        }

        tracing::debug!(team_id = %team_id, "team deleted");
        self.emit(TeamEvent::Deleted { team_id }.into());
        Ok(removed)
    }

    /// Records `team_id` as the deployed team, stamped with the current time
    pub fn deploy_team(&mut self, team_id: Uuid) -> StoreResult<DeployedTeam> {
        let team = self
            .get_team_by_id(team_id)
            .ok_or(StoreError::TeamNotFound(team_id))?;
        let deployed = DeployedTeam {
            id: team.id(),
            name: team.name().to_string(),
            deployed_at: self.clock.now(),
        };

        tracing::debug!(team_id = %team_id, "team deployed");
        self.set_deployed_team(Some(deployed.clone()));
        Ok(deployed)
    }

    // ===== Workflow operations on the current team =====

    /// Appends `agent_id` to the current team's workflow
    ///
    /// The new node's order is one past the highest order in the workflow.
    pub fn add_agent_to_workflow(
        &mut self,
        agent_id: impl Into<String>,
        position: Position,
    ) -> StoreResult<WorkflowNode> {
        let agent_id = agent_id.into();
        self.mutate_current("add_agent", |team, now| {
            let event = team.add_agent(agent_id.clone(), position, now)?;
            let node = team
                .workflow()
                .iter()
                .find(|node| node.agent_id == agent_id)
                .cloned()
                .ok_or_else(|| TeamError::AgentNotInWorkflow(agent_id.clone()))?;
            Ok((node, event))
        })
    }

    /// Removes `agent_id` from the current workflow and renumbers the rest
    pub fn remove_agent_from_workflow(&mut self, agent_id: &str) -> StoreResult<WorkflowNode> {
        self.mutate_current("remove_agent", |team, now| team.remove_agent(agent_id, now))
    }

    /// Moves a node on the canvas without touching execution order
    pub fn update_agent_position(&mut self, agent_id: &str, position: Position) -> StoreResult<()> {
        self.mutate_current("move_agent", |team, now| {
            team.move_agent(agent_id, position, now).map(|event| ((), event))
        })
    }

    /// Sets each listed agent's order to its 1-based index in `agent_ids`
    ///
    /// Unlisted agents keep their order; a partial list may leave duplicate
    /// orders behind. See [`TeamStore::reorder_workflow_strict`].
    pub fn reorder_workflow(&mut self, agent_ids: &[String]) -> StoreResult<()> {
        self.mutate_current("reorder", |team, now| Ok(((), team.reorder(agent_ids, now))))
    }

    /// Reorders only when `agent_ids` names every workflow agent exactly once
    pub fn reorder_workflow_strict(&mut self, agent_ids: &[String]) -> StoreResult<()> {
        self.mutate_current("reorder_strict", |team, now| {
            team.reorder_strict(agent_ids, now).map(|event| ((), event))
        })
    }

    /// Empties the current team's workflow
    pub fn clear_workflow(&mut self) -> StoreResult<()> {
        self.mutate_current("clear_workflow", |team, now| Ok(((), team.clear_workflow(now))))
    }

    // ===== Queries =====

    pub fn get_team_by_id(&self, team_id: Uuid) -> Option<&Team> {
        self.teams.iter().find(|team| team.id() == team_id)
    }

    /// The current team's workflow sorted by execution order
    ///
    /// Empty when there is no current team. Consumers must use this rather
    /// than the storage order of `Team::workflow`.
    pub fn workflow_agents(&self) -> Vec<WorkflowNode> {
        self.current_team()
            .map(Team::sorted_workflow)
            .unwrap_or_default()
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// The team being edited, if it is still in the store
    pub fn current_team(&self) -> Option<&Team> {
        self.current_team_id.and_then(|id| self.get_team_by_id(id))
    }

    pub fn deployed_team(&self) -> Option<&DeployedTeam> {
        self.deployed_team.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn snapshot(&self) -> StoreState {
        StoreState {
            teams: self.teams.clone(),
            current_team: self.current_team().cloned(),
            deployed_team: self.deployed_team.clone(),
            is_loading: self.is_loading,
        }
    }

    // ===== Setters =====

    /// Replaces the whole team collection
    ///
    /// The current team selection is kept by id; if that id is absent from
    /// `teams`, `current_team` resolves to `None`.
    pub fn set_teams(&mut self, teams: Vec<Team>) {
        let count = teams.len();
        self.teams = teams;
        self.emit(StoreEvent::TeamsReplaced { count });
    }

    /// Selects the team to edit, or clears the selection
    ///
    /// An id with no matching team is stored as given; `current_team`
    /// then resolves to `None` until a team with that id appears.
    pub fn set_current_team(&mut self, team_id: Option<Uuid>) {
        self.current_team_id = team_id;
        self.emit(StoreEvent::CurrentTeamChanged { team_id });
    }

    pub fn set_deployed_team(&mut self, deployed: Option<DeployedTeam>) {
        let team_id = deployed.as_ref().map(|d| d.id);
        self.deployed_team = deployed;
        self.emit(StoreEvent::DeployedTeamChanged { team_id });
    }

    pub fn set_is_loading(&mut self, is_loading: bool) {
        self.is_loading = is_loading;
        self.emit(StoreEvent::LoadingChanged { is_loading });
    }

    // ===== Subscriptions =====

    /// Registers `listener`, called with the new state after every change
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&StoreState, &StoreEvent) + Send + Sync + 'static,
    {
        self.subscribers.add(Box::new(listener))
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    // ===== Internals =====

    fn index_of(&self, team_id: Uuid) -> Option<usize> {
        self.teams.iter().position(|team| team.id() == team_id)
    }

    fn team_mut(&mut self, team_id: Uuid) -> StoreResult<&mut Team> {
        self.teams
            .iter_mut()
            .find(|team| team.id() == team_id)
            .ok_or(StoreError::TeamNotFound(team_id))
    }

    /// Runs `op` against the current team and notifies on success
    fn mutate_current<R>(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&mut Team, DateTime<Utc>) -> Result<(R, TeamEvent), TeamError>,
    ) -> StoreResult<R> {
        let Some(index) = self.current_team_id.and_then(|id| self.index_of(id)) else {
            tracing::debug!(op, "no current team, ignoring");
            return Err(StoreError::NoCurrentTeam);
        };

        let now = self.clock.now();
        match f(&mut self.teams[index], now) {
            Ok((value, event)) => {
                tracing::debug!(op, team_id = %event.team_id(), "workflow updated");
                self.emit(event.into());
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(op, error = %err, "workflow left unchanged");
                Err(err.into())
            }
        }
    }

    fn emit(&self, event: StoreEvent) {
        if self.subscribers.is_empty() {
            return;
        }
        let state = self.snapshot();
        self.subscribers.notify(&state, &event);
    }
}

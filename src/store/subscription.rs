use std::fmt;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::team::TeamEvent;

use super::state::StoreState;

/// What changed in the store
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoreEvent {
    Team { event: TeamEvent },
    TeamsReplaced { count: usize },
    CurrentTeamChanged { team_id: Option<Uuid> },
    DeployedTeamChanged { team_id: Option<Uuid> },
    LoadingChanged { is_loading: bool },
}

impl From<TeamEvent> for StoreEvent {
    fn from(event: TeamEvent) -> Self {
        StoreEvent::Team { event }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Listener = Box<dyn Fn(&StoreState, &StoreEvent) + Send + Sync>;

/// Observers notified after each completed state transition
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl Subscribers {
    pub(crate) fn add(&mut self, listener: Listener) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }

    pub(crate) fn notify(&self, state: &StoreState, event: &StoreEvent) {
        for (_, listener) in &self.listeners {
            listener(state, event);
        }
    }
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.listeners.len())
            .finish()
    }
}

use thiserror::Error;

/// Rule violations raised by the Team aggregate
///
/// Every variant means the team was left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TeamError {
    #[error("Agent already in workflow: {0}")]
    AgentAlreadyInWorkflow(String),

    #[error("Agent not in workflow: {0}")]
    AgentNotInWorkflow(String),

    #[error("Reorder list does not match workflow: {0}")]
    ReorderMismatch(String),
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Canvas coordinate of a workflow node
///
/// Purely presentational: moving a node never changes execution order.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A reference to an agent placed in a team's workflow
///
/// # Invariants
/// - `order` is 1-based
/// - `agent_id` appears at most once per workflow
///
/// The referenced agent is defined outside this crate and is never validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNode {
    pub agent_id: String,
    pub position: Position,
    pub order: u32,
}

/// Partial update of a team's editable fields
///
/// Fields left as `None` keep their current value.
///
/// # Example
/// ```
/// use teamforge_api::domain::team::TeamPatch;
///
/// let patch = TeamPatch::default().name("Reviewers").chaining_enabled(false);
/// assert_eq!(patch.name.as_deref(), Some("Reviewers"));
/// assert!(patch.description.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub chaining_enabled: Option<bool>,
}

impl TeamPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn chaining_enabled(mut self, enabled: bool) -> Self {
        self.chaining_enabled = Some(enabled);
        self
    }
}

/// Lightweight record of the team that was last deployed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedTeam {
    pub id: Uuid,
    pub name: String,
    pub deployed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_default_is_origin() {
        assert_eq!(Position::default(), Position::new(0.0, 0.0));
    }

    #[test]
    fn workflow_node_serializes_camel_case() {
        let node = WorkflowNode {
            agent_id: "code-reviewer".to_string(),
            position: Position::new(10.0, 20.5),
            order: 1,
        };

        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["agentId"], "code-reviewer");
        assert_eq!(json["position"]["y"], 20.5);
        assert_eq!(json["order"], 1);
    }

    #[test]
    fn patch_builder_sets_fields() {
        let patch = TeamPatch::default()
            .name("A")
            .description("d")
            .chaining_enabled(true);

        assert_eq!(patch.name.as_deref(), Some("A"));
        assert_eq!(patch.description.as_deref(), Some("d"));
        assert_eq!(patch.chaining_enabled, Some(true));
    }

    #[test]
    fn empty_patch_deserializes_from_empty_object() {
        let patch: TeamPatch = serde_json::from_str("{}").unwrap();
        assert_eq!(patch, TeamPatch::default());
    }

    #[test]
    fn patch_reads_camel_case_flag() {
        let patch: TeamPatch = serde_json::from_str(r#"{"chainingEnabled": false}"#).unwrap();
        assert_eq!(patch.chaining_enabled, Some(false));
    }
}

//! Status and node-type enums shared by the engine and the database layer.
//!
//! Each enum maps onto a Postgres enum type created in `db/migrations`, so
//! the variants here must stay in sync with the migration that defines them.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a workflow instance.
///
/// `Suspended` and `Terminated` are declared for completeness but no engine
/// operation currently transitions into them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "workflow_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    Draft,
    Active,
    Suspended,
    Completed,
    Terminated,
}

impl InstanceStatus {
    /// Terminal statuses no longer block template deletion.
    pub fn is_terminal(self) -> bool {
        matches!(self, InstanceStatus::Completed | InstanceStatus::Terminated)
    }
}

/// Type of a node in a template graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "workflow_node_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Start,
    End,
    Task,
    Decision,
    Parallel,
    Merge,
}

/// What the auto-flow engine does when a node of a given type is activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowBehavior {
    /// Activate the node and wait for a completion event.
    Activate,
    /// Activating the node completes the owning instance.
    CompleteInstance,
}

impl NodeType {
    /// Tagged dispatch point for per-type flow semantics.
    ///
    /// Decision, parallel and merge nodes carry no branching or joining
    /// semantics yet; they follow plain task activation until a strategy
    /// for them is defined.
    pub fn flow_behavior(self) -> FlowBehavior {
        match self {
            NodeType::End => FlowBehavior::CompleteInstance,
            NodeType::Start
            | NodeType::Task
            | NodeType::Decision
            | NodeType::Parallel
            | NodeType::Merge => FlowBehavior::Activate,
        }
    }
}

/// Runtime status of a node instance.
///
/// The reachable path is `Pending -> Active -> Completed`. `Skipped` and
/// `Failed` are reserved; no current operation transitions into them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "workflow_node_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Pending,
    Active,
    Completed,
    Skipped,
    Failed,
}

impl NodeStatus {
    /// Whether a completion request is allowed from this status.
    pub fn can_complete(self) -> bool {
        matches!(self, NodeStatus::Pending | NodeStatus::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_instance_statuses() {
        assert!(InstanceStatus::Completed.is_terminal());
        assert!(InstanceStatus::Terminated.is_terminal());
        assert!(!InstanceStatus::Draft.is_terminal());
        assert!(!InstanceStatus::Active.is_terminal());
        assert!(!InstanceStatus::Suspended.is_terminal());
    }

    #[test]
    fn test_only_end_nodes_complete_the_instance() {
        assert_eq!(NodeType::End.flow_behavior(), FlowBehavior::CompleteInstance);
        for ty in [
            NodeType::Start,
            NodeType::Task,
            NodeType::Decision,
            NodeType::Parallel,
            NodeType::Merge,
        ] {
            assert_eq!(ty.flow_behavior(), FlowBehavior::Activate);
        }
    }

    #[test]
    fn test_completable_node_statuses() {
        assert!(NodeStatus::Pending.can_complete());
        assert!(NodeStatus::Active.can_complete());
        assert!(!NodeStatus::Completed.can_complete());
        assert!(!NodeStatus::Skipped.can_complete());
        assert!(!NodeStatus::Failed.can_complete());
    }

    #[test]
    fn test_status_serde_uses_lowercase() {
        let json = serde_json::to_string(&NodeType::Decision).unwrap();
        assert_eq!(json, "\"decision\"");
        let back: NodeStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(back, NodeStatus::Pending);
    }
}

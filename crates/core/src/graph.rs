//! Parsed workflow template graphs.
//!
//! A template stores its graph as a JSON blob (the `definition` column):
//! an ordered list of node descriptors and an ordered list of transition
//! descriptors. The engine parses that blob once into a [`TemplateGraph`]
//! (node map plus adjacency list keyed by source node id) instead of
//! re-reading the JSON on every auto-flow step.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::assignee::AssigneeTarget;
use crate::error::CoreError;
use crate::status::NodeType;
use crate::types::DbId;

/// One node entry in a template definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// Graph-local id; unique within the definition.
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Free-form per-node configuration, copied onto node rows verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_role_id: Option<DbId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_department_id: Option<DbId>,
}

impl NodeDescriptor {
    /// The assignment target, if any.
    ///
    /// Templates are expected to set at most one assignee field; when more
    /// than one is set, user wins over role wins over department.
    pub fn assignee(&self) -> Option<AssigneeTarget> {
        if let Some(id) = self.assignee_id {
            Some(AssigneeTarget::User(id))
        } else if let Some(id) = self.assignee_role_id {
            Some(AssigneeTarget::Role(id))
        } else {
            self.assignee_department_id.map(AssigneeTarget::Department)
        }
    }
}

/// One directed edge in a template definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionDescriptor {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// The raw, ordered shape of a template `definition` blob.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    #[serde(default)]
    pub nodes: Vec<NodeDescriptor>,
    #[serde(default)]
    pub transitions: Vec<TransitionDescriptor>,
}

/// A template definition parsed into lookup structures.
///
/// Built once per template version and cached by the engine. Duplicate node
/// ids are rejected at parse time (one node row per node id per instance is
/// a hard invariant); dangling transition endpoints are tolerated and only
/// logged, since the engine skips missing targets at runtime.
#[derive(Debug, Clone)]
pub struct TemplateGraph {
    nodes: Vec<NodeDescriptor>,
    index: HashMap<String, usize>,
    outgoing: HashMap<String, Vec<TransitionDescriptor>>,
}

impl TemplateGraph {
    /// Parse a raw `definition` JSON value into a graph.
    pub fn parse(definition: &serde_json::Value) -> Result<Self, CoreError> {
        let def: WorkflowDefinition = serde_json::from_value(definition.clone())
            .map_err(|e| CoreError::Validation(format!("invalid workflow definition: {e}")))?;
        Self::from_definition(def)
    }

    /// Build a graph from an already-deserialized definition.
    pub fn from_definition(def: WorkflowDefinition) -> Result<Self, CoreError> {
        let mut index = HashMap::with_capacity(def.nodes.len());
        for (i, node) in def.nodes.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                return Err(CoreError::Validation(format!(
                    "duplicate node id '{}' in workflow definition",
                    node.id
                )));
            }
        }

        let mut outgoing: HashMap<String, Vec<TransitionDescriptor>> = HashMap::new();
        for t in &def.transitions {
            if !index.contains_key(&t.from) || !index.contains_key(&t.to) {
                tracing::warn!(
                    from = %t.from,
                    to = %t.to,
                    "transition references an unknown node id; it will never fire"
                );
            }
            outgoing.entry(t.from.clone()).or_default().push(t.clone());
        }

        Ok(Self {
            nodes: def.nodes,
            index,
            outgoing,
        })
    }

    /// All node descriptors in definition order.
    pub fn nodes(&self) -> &[NodeDescriptor] {
        &self.nodes
    }

    /// Look up a node descriptor by its graph-local id.
    pub fn node(&self, id: &str) -> Option<&NodeDescriptor> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Transitions leaving the given node, in definition order.
    pub fn outgoing(&self, from: &str) -> &[TransitionDescriptor] {
        self.outgoing.get(from).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ids of all START-type nodes.
    pub fn start_node_ids(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| n.node_type == NodeType::Start)
            .map(|n| n.id.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn linear_definition() -> serde_json::Value {
        json!({
            "nodes": [
                {"id": "start", "name": "Start", "type": "start"},
                {"id": "task1", "name": "Review", "type": "task", "assignee_id": 5},
                {"id": "end", "name": "End", "type": "end"}
            ],
            "transitions": [
                {"from": "start", "to": "task1"},
                {"from": "task1", "to": "end", "name": "done"}
            ]
        })
    }

    #[test]
    fn test_parse_builds_index_and_adjacency() {
        let graph = TemplateGraph::parse(&linear_definition()).unwrap();
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.node("task1").unwrap().name, "Review");
        assert_eq!(graph.outgoing("start").len(), 1);
        assert_eq!(graph.outgoing("start")[0].to, "task1");
        assert_eq!(graph.outgoing("task1")[0].name.as_deref(), Some("done"));
        assert!(graph.outgoing("end").is_empty());
        assert_eq!(graph.start_node_ids(), vec!["start"]);
    }

    #[test]
    fn test_duplicate_node_ids_rejected() {
        let def = json!({
            "nodes": [
                {"id": "a", "name": "A", "type": "task"},
                {"id": "a", "name": "A again", "type": "task"}
            ],
            "transitions": []
        });
        let err = TemplateGraph::parse(&def).unwrap_err();
        assert!(err.to_string().contains("duplicate node id"));
    }

    #[test]
    fn test_dangling_transition_is_kept_but_inert() {
        let def = json!({
            "nodes": [{"id": "a", "name": "A", "type": "task"}],
            "transitions": [{"from": "a", "to": "missing"}]
        });
        let graph = TemplateGraph::parse(&def).unwrap();
        assert_eq!(graph.outgoing("a").len(), 1);
        assert!(graph.node("missing").is_none());
    }

    #[test]
    fn test_unknown_node_type_is_a_validation_error() {
        let def = json!({
            "nodes": [{"id": "a", "name": "A", "type": "loop"}],
            "transitions": []
        });
        assert!(matches!(
            TemplateGraph::parse(&def),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let graph = TemplateGraph::parse(&json!({})).unwrap();
        assert!(graph.is_empty());
        assert!(graph.start_node_ids().is_empty());
    }

    #[test]
    fn test_assignee_extraction_prefers_user_over_role_over_department() {
        let node: NodeDescriptor = serde_json::from_value(json!({
            "id": "n", "name": "N", "type": "task",
            "assignee_role_id": 2, "assignee_department_id": 3
        }))
        .unwrap();
        assert_eq!(node.assignee(), Some(AssigneeTarget::Role(2)));

        let plain: NodeDescriptor =
            serde_json::from_value(json!({"id": "n", "name": "N", "type": "start"})).unwrap();
        assert_eq!(plain.assignee(), None);
    }
}

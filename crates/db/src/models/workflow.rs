//! Workflow entity models and DTOs: templates, instances, node instances,
//! and the transition audit log.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use oversight_core::assignee::AssigneeTarget;
use oversight_core::status::{InstanceStatus, NodeStatus, NodeType};
use oversight_core::types::{DbId, Timestamp};

/// A row from the `workflow_templates` table.
///
/// `definition` holds the graph blob; parse it with
/// `oversight_core::graph::TemplateGraph` rather than walking the JSON.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkflowTemplate {
    pub id: DbId,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub template_type: String,
    pub version: String,
    pub is_enabled: bool,
    pub is_builtin: bool,
    pub definition: serde_json::Value,
    pub form_config: Option<serde_json::Value>,
    pub permission_config: Option<serde_json::Value>,
    pub notification_config: Option<serde_json::Value>,
    pub sort_order: i32,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a workflow template.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTemplate {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub template_type: String,
    /// Defaults to "1.0" if omitted.
    pub version: Option<String>,
    /// Defaults to `true` if omitted.
    pub is_enabled: Option<bool>,
    pub definition: serde_json::Value,
    pub form_config: Option<serde_json::Value>,
    pub permission_config: Option<serde_json::Value>,
    pub notification_config: Option<serde_json::Value>,
}

/// DTO for updating a workflow template. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTemplate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub is_enabled: Option<bool>,
    pub definition: Option<serde_json::Value>,
    pub form_config: Option<serde_json::Value>,
    pub permission_config: Option<serde_json::Value>,
    pub notification_config: Option<serde_json::Value>,
    pub sort_order: Option<i32>,
}

/// Filters for listing templates.
#[derive(Debug, Clone, Default)]
pub struct TemplateFilter {
    /// Case-insensitive match against name, code, or description.
    pub keyword: Option<String>,
    pub template_type: Option<String>,
    pub is_enabled: Option<bool>,
}

/// A row from the `workflow_instances` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkflowInstance {
    pub id: DbId,
    pub number: String,
    pub title: String,
    pub template_id: DbId,
    pub initiator_id: DbId,
    pub business_id: Option<DbId>,
    pub business_type: Option<String>,
    pub status: InstanceStatus,
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    pub business_data: Option<serde_json::Value>,
    pub variables: serde_json::Value,
    pub priority: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a workflow instance.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInstance {
    pub template_id: DbId,
    pub title: String,
    pub business_id: Option<DbId>,
    pub business_type: Option<String>,
    pub business_data: Option<serde_json::Value>,
    /// Defaults to `{}` if omitted.
    pub variables: Option<serde_json::Value>,
    /// Defaults to 1 if omitted.
    pub priority: Option<i32>,
}

/// Filters for listing instances.
#[derive(Debug, Clone, Default)]
pub struct InstanceFilter {
    /// Case-insensitive match against title or number.
    pub keyword: Option<String>,
    pub status: Option<InstanceStatus>,
    pub initiator_id: Option<DbId>,
    pub template_id: Option<DbId>,
    pub business_type: Option<String>,
}

/// A row from the `workflow_nodes` table (a node *instance*, not a
/// definition; `node_id` refers back into the template graph).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkflowNode {
    pub id: DbId,
    pub instance_id: DbId,
    pub node_id: String,
    pub name: String,
    pub node_type: NodeType,
    pub status: NodeStatus,
    pub assignee_id: Option<DbId>,
    pub assignee_role_id: Option<DbId>,
    pub assignee_department_id: Option<DbId>,
    pub processor_id: Option<DbId>,
    pub enter_time: Option<Timestamp>,
    pub start_time: Option<Timestamp>,
    pub complete_time: Option<Timestamp>,
    pub deadline: Option<Timestamp>,
    pub node_data: Option<serde_json::Value>,
    pub form_data: Option<serde_json::Value>,
    pub comment: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl WorkflowNode {
    /// The assignment target of this node, if any.
    ///
    /// Rows are expected to carry at most one assignee column; when more
    /// than one is set, user wins over role wins over department (same
    /// precedence as the template descriptor).
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

/// A row from the append-only `workflow_transitions` audit log.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkflowTransition {
    pub id: DbId,
    pub instance_id: DbId,
    pub from_node_id: Option<String>,
    pub to_node_id: String,
    pub executor_id: Option<DbId>,
    pub comment: Option<String>,
    pub executed_at: Timestamp,
}

/// An instance together with its node rows and audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceDetail {
    pub instance: WorkflowInstance,
    pub nodes: Vec<WorkflowNode>,
    pub transitions: Vec<WorkflowTransition>,
}

/// Aggregate workflow counts for the statistics endpoint.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct WorkflowStats {
    pub total_templates: i64,
    pub active_templates: i64,
    pub total_instances: i64,
    pub running_instances: i64,
    pub completed_instances: i64,
    pub pending_tasks: i64,
    pub overdue_tasks: i64,
}

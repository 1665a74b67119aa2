//! Notification seam.
//!
//! The engine reports state changes (a task became actionable, an
//! instance finished) through [`WorkflowNotifier`]. Actual delivery
//! channels are outside this system; the shipped implementations log or
//! drop the events. Notifiers run after the owning transaction commits,
//! so they never observe rolled-back state.

use async_trait::async_trait;

use oversight_core::types::DbId;
use oversight_db::models::workflow::WorkflowNode;

/// Receives workflow state-change events.
#[async_trait]
pub trait WorkflowNotifier: Send + Sync {
    /// A node became ACTIVE and awaits its assignee.
    async fn task_activated(&self, node: &WorkflowNode);

    /// An instance reached an END node and is COMPLETED.
    async fn instance_completed(&self, instance_id: DbId);
}

/// Stub notifier that logs events instead of delivering anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl WorkflowNotifier for LogNotifier {
    async fn task_activated(&self, node: &WorkflowNode) {
        tracing::info!(
            node = node.id,
            instance = node.instance_id,
            node_id = %node.node_id,
            name = %node.name,
            "task activated"
        );
    }

    async fn instance_completed(&self, instance_id: DbId) {
        tracing::info!(instance = instance_id, "workflow instance completed");
    }
}

/// Notifier that drops every event. Useful when embedding the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl WorkflowNotifier for NoopNotifier {
    async fn task_activated(&self, _node: &WorkflowNode) {}

    async fn instance_completed(&self, _instance_id: DbId) {}
}

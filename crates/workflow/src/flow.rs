//! The auto-flow engine.
//!
//! Given a set of seed nodes (just-completed tasks, or the START nodes at
//! instance start), walk the template graph one hop: evaluate the
//! conditions of outgoing transitions, activate eligible PENDING targets,
//! and complete the instance when an END node is reached. Activated nodes
//! are not traversed further; they flow on when they are completed.

use sqlx::PgConnection;

use oversight_core::graph::TemplateGraph;
use oversight_core::status::FlowBehavior;
use oversight_core::types::DbId;
use oversight_db::models::workflow::{WorkflowInstance, WorkflowNode};
use oversight_db::repositories::{InstanceRepo, NodeRepo, TransitionRepo};

use crate::service::WorkflowService;
use crate::WorkflowResult;

/// What one auto-flow pass changed. Used for post-commit notifications.
#[derive(Debug, Default)]
pub struct FlowOutcome {
    /// Nodes that moved PENDING -> ACTIVE during the pass.
    pub activated: Vec<WorkflowNode>,
    /// Set when an END node was reached and the instance was completed.
    pub completed_instance: Option<DbId>,
}

impl WorkflowService {
    /// Run one auto-flow pass inside the caller's transaction.
    ///
    /// Per traversed edge this appends one audit row. A transition whose
    /// target has no node row is logged and skipped so sibling branches
    /// keep making progress; a target that is not PENDING is a silent
    /// no-op (a node is never re-activated).
    pub(crate) async fn auto_flow(
        &self,
        conn: &mut PgConnection,
        graph: &TemplateGraph,
        instance: &WorkflowInstance,
        seeds: &[WorkflowNode],
        actor_id: DbId,
    ) -> WorkflowResult<FlowOutcome> {
        let mut outcome = FlowOutcome::default();

        for seed in seeds {
            for transition in graph.outgoing(&seed.node_id) {
                let eligible = self
                    .conditions
                    .evaluate(transition.condition.as_deref(), &instance.variables);
                if !eligible {
                    tracing::debug!(
                        instance = instance.id,
                        from = %transition.from,
                        to = %transition.to,
                        "transition condition not met; skipping"
                    );
                    continue;
                }

                let Some(target) =
                    NodeRepo::activate(conn, instance.id, &transition.to).await?
                else {
                    if graph.node(&transition.to).is_none() {
                        tracing::warn!(
                            instance = instance.id,
                            from = %transition.from,
                            to = %transition.to,
                            "auto-flow target has no node row; skipping edge"
                        );
                    }
                    continue;
                };

                TransitionRepo::append(
                    conn,
                    instance.id,
                    Some(&seed.node_id),
                    &target.node_id,
                    Some(actor_id),
                    transition.name.as_deref().unwrap_or("auto-flow"),
                )
                .await?;

                if target.node_type.flow_behavior() == FlowBehavior::CompleteInstance {
                    InstanceRepo::mark_completed(conn, instance.id).await?;
                    outcome.completed_instance = Some(instance.id);
                    tracing::info!(
                        instance = instance.id,
                        node_id = %target.node_id,
                        "end node reached; instance completed"
                    );
                }

                outcome.activated.push(target);
            }
        }

        Ok(outcome)
    }
}

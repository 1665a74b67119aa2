//! Task execution: "my tasks" queries and task completion.

use oversight_core::error::CoreError;
use oversight_core::status::NodeStatus;
use oversight_core::types::DbId;
use oversight_db::models::workflow::WorkflowNode;
use oversight_db::repositories::{InstanceRepo, NodeRepo, TemplateRepo, TransitionRepo, UserRepo};

use crate::service::{Page, WorkflowService};
use crate::{WorkflowError, WorkflowResult};

/// Status filter applied when the caller supplies none.
const DEFAULT_TASK_STATUSES: &[NodeStatus] = &[NodeStatus::Pending, NodeStatus::Active];

impl WorkflowService {
    /// List the tasks a user may act on: nodes of ACTIVE instances
    /// assigned to the user directly, to one of their roles, or to their
    /// department. Most recently entered first.
    ///
    /// An unknown user yields an empty page rather than an error.
    pub async fn list_user_tasks(
        &self,
        user_id: DbId,
        status_filter: Option<Vec<NodeStatus>>,
        limit: Option<i64>,
        offset: i64,
    ) -> WorkflowResult<Page<WorkflowNode>> {
        let Some(actor) = UserRepo::actor_context(&self.pool, user_id).await? else {
            tracing::warn!(user = user_id, "task listing for unknown user");
            return Ok(Page::empty());
        };

        let statuses = status_filter.unwrap_or_else(|| DEFAULT_TASK_STATUSES.to_vec());
        let limit = Self::clamp_limit(limit);

        let items = NodeRepo::tasks_for_actor(&self.pool, &actor, &statuses, limit, offset).await?;
        let total = NodeRepo::count_tasks_for_actor(&self.pool, &actor, &statuses).await?;
        Ok(Page { items, total })
    }

    /// Complete a task node as the given user.
    ///
    /// Fails with `NotFound` when the node is missing, `PermissionDenied`
    /// when the caller does not match the node's assignee (checked before
    /// status, so a non-assignee never learns the node's state), and
    /// `InvalidState` unless the node is PENDING or ACTIVE. On success the
    /// node is COMPLETED, a completion audit row is appended (from = NULL,
    /// to = the node), and one auto-flow pass runs, all in one transaction.
    pub async fn complete_task(
        &self,
        node_id: DbId,
        actor_id: DbId,
        form_data: Option<serde_json::Value>,
        comment: Option<&str>,
    ) -> WorkflowResult<bool> {
        let actor = UserRepo::actor_context(&self.pool, actor_id)
            .await?
            .ok_or_else(|| -> WorkflowError {
                CoreError::NotFound {
                    entity: "User",
                    id: actor_id,
                }
                .into()
            })?;

        let mut tx = self.pool.begin().await?;

        let node = NodeRepo::find_for_update(&mut tx, node_id)
            .await?
            .ok_or_else(|| -> WorkflowError {
                CoreError::NotFound {
                    entity: "WorkflowNode",
                    id: node_id,
                }
                .into()
            })?;

        let permitted = node
            .assignee()
            .is_some_and(|target| target.resolves_for(&actor));
        if !permitted {
            return Err(CoreError::PermissionDenied(format!(
                "user {actor_id} is not an assignee of node '{}'",
                node.node_id
            ))
            .into());
        }

        if !node.status.can_complete() {
            return Err(CoreError::InvalidState(format!(
                "node '{}' cannot be completed from status {:?}",
                node.node_id, node.status
            ))
            .into());
        }

        let node = NodeRepo::complete(&mut tx, node_id, actor_id, form_data.as_ref(), comment)
            .await?
            .ok_or_else(|| -> WorkflowError {
                // Guarded above under the row lock; reaching this means the
                // row changed underneath us.
                CoreError::Internal(format!("node {node_id} completion raced")).into()
            })?;

        TransitionRepo::append(
            &mut tx,
            node.instance_id,
            None,
            &node.node_id,
            Some(actor_id),
            &format!("complete task: {}", node.name),
        )
        .await?;

        let instance = InstanceRepo::find_for_update(&mut tx, node.instance_id)
            .await?
            .ok_or_else(|| -> WorkflowError {
                CoreError::NotFound {
                    entity: "WorkflowInstance",
                    id: node.instance_id,
                }
                .into()
            })?;
        let template = TemplateRepo::find_by_id(&self.pool, instance.template_id)
            .await?
            .ok_or_else(|| -> WorkflowError {
                CoreError::NotFound {
                    entity: "WorkflowTemplate",
                    id: instance.template_id,
                }
                .into()
            })?;
        let graph = self.graph_for(&template)?;

        let outcome = self
            .auto_flow(&mut tx, &graph, &instance, std::slice::from_ref(&node), actor_id)
            .await?;
        tx.commit().await?;

        self.emit(&outcome).await;

        tracing::info!(
            node = node_id,
            instance = node.instance_id,
            processor = actor_id,
            "task completed"
        );
        Ok(true)
    }
}

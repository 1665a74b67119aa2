//! Repository for the `workflow_nodes` table.
//!
//! Status transitions are guarded in SQL: activation only fires on PENDING
//! rows and completion only on PENDING/ACTIVE rows, so concurrent callers
//! cannot double-apply a transition.

use sqlx::{PgConnection, PgPool};

use oversight_core::assignee::ActorContext;
use oversight_core::status::NodeStatus;
use oversight_core::types::DbId;

use crate::models::workflow::WorkflowNode;

/// Column list for `workflow_nodes` queries.
const COLUMNS: &str = "id, instance_id, node_id, name, node_type, status, \
    assignee_id, assignee_role_id, assignee_department_id, processor_id, \
    enter_time, start_time, complete_time, deadline, node_data, form_data, \
    comment, created_at, updated_at";

/// Column list with the `n.` prefix, for JOIN queries.
const PREFIXED: &str = "n.id, n.instance_id, n.node_id, n.name, n.node_type, n.status, \
    n.assignee_id, n.assignee_role_id, n.assignee_department_id, n.processor_id, \
    n.enter_time, n.start_time, n.complete_time, n.deadline, n.node_data, n.form_data, \
    n.comment, n.created_at, n.updated_at";

/// Assignment match against an actor: direct, by role membership, or by
/// department. $2 = user id, $3 = role id array, $4 = department id.
const ASSIGNED_TO_ACTOR: &str = "(n.assignee_id = $2 \
    OR n.assignee_role_id = ANY($3) \
    OR ($4::bigint IS NOT NULL AND n.assignee_department_id = $4))";

/// Provides CRUD and state-transition operations for node instances.
pub struct NodeRepo;

impl NodeRepo {
    /// Find a node by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<WorkflowNode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workflow_nodes WHERE id = $1");
        sqlx::query_as::<_, WorkflowNode>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a node inside a transaction, locking the row.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<WorkflowNode>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workflow_nodes WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, WorkflowNode>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// All node rows of an instance, in creation order.
    pub async fn list_for_instance(
        pool: &PgPool,
        instance_id: DbId,
    ) -> Result<Vec<WorkflowNode>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM workflow_nodes WHERE instance_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, WorkflowNode>(&query)
            .bind(instance_id)
            .fetch_all(pool)
            .await
    }

    /// Tasks assigned to an actor (directly, via role, or via department)
    /// on ACTIVE instances, most recently entered first.
    pub async fn tasks_for_actor(
        pool: &PgPool,
        actor: &ActorContext,
        statuses: &[NodeStatus],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WorkflowNode>, sqlx::Error> {
        let query = format!(
            "SELECT {PREFIXED}
             FROM workflow_nodes n
             JOIN workflow_instances i ON i.id = n.instance_id
             WHERE i.status = 'active'
               AND n.status = ANY($1)
               AND {ASSIGNED_TO_ACTOR}
             ORDER BY n.enter_time DESC NULLS LAST, n.id
             LIMIT $5 OFFSET $6"
        );
        sqlx::query_as::<_, WorkflowNode>(&query)
            .bind(statuses)
            .bind(actor.user_id)
            .bind(&actor.role_ids)
            .bind(actor.department_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count of tasks matching [`Self::tasks_for_actor`].
    pub async fn count_tasks_for_actor(
        pool: &PgPool,
        actor: &ActorContext,
        statuses: &[NodeStatus],
    ) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*)
             FROM workflow_nodes n
             JOIN workflow_instances i ON i.id = n.instance_id
             WHERE i.status = 'active'
               AND n.status = ANY($1)
               AND {ASSIGNED_TO_ACTOR}"
        );
        sqlx::query_scalar(&query)
            .bind(statuses)
            .bind(actor.user_id)
            .bind(&actor.role_ids)
            .bind(actor.department_id)
            .fetch_one(pool)
            .await
    }

    /// Activate a node by its graph-local id within an instance.
    ///
    /// Only fires when the node is PENDING; returns the activated row or
    /// `None` when the node is missing or not PENDING (a no-op for the
    /// auto-flow engine).
    pub async fn activate(
        conn: &mut PgConnection,
        instance_id: DbId,
        node_id: &str,
    ) -> Result<Option<WorkflowNode>, sqlx::Error> {
        let query = format!(
            "UPDATE workflow_nodes
             SET status = 'active', enter_time = NOW(), updated_at = NOW()
             WHERE instance_id = $1 AND node_id = $2 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkflowNode>(&query)
            .bind(instance_id)
            .bind(node_id)
            .fetch_optional(conn)
            .await
    }

    /// Activate every PENDING START node of an instance, returning them.
    pub async fn activate_start_nodes(
        conn: &mut PgConnection,
        instance_id: DbId,
    ) -> Result<Vec<WorkflowNode>, sqlx::Error> {
        let query = format!(
            "UPDATE workflow_nodes
             SET status = 'active', enter_time = NOW(), updated_at = NOW()
             WHERE instance_id = $1 AND node_type = 'start' AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkflowNode>(&query)
            .bind(instance_id)
            .fetch_all(conn)
            .await
    }

    /// Complete a node: set COMPLETED, record the processor, stamp the
    /// completion time (and the start time if unset), and merge the
    /// supplied form data and comment.
    ///
    /// Only fires when the node is PENDING or ACTIVE; returns the updated
    /// row or `None` otherwise.
    pub async fn complete(
        conn: &mut PgConnection,
        id: DbId,
        processor_id: DbId,
        form_data: Option<&serde_json::Value>,
        comment: Option<&str>,
    ) -> Result<Option<WorkflowNode>, sqlx::Error> {
        let query = format!(
            "UPDATE workflow_nodes
             SET status = 'completed',
                 processor_id = $2,
                 complete_time = NOW(),
                 start_time = COALESCE(start_time, NOW()),
                 form_data = COALESCE($3, form_data),
                 comment = COALESCE($4, comment),
                 updated_at = NOW()
             WHERE id = $1 AND status IN ('pending', 'active')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkflowNode>(&query)
            .bind(id)
            .bind(processor_id)
            .bind(form_data)
            .bind(comment)
            .fetch_optional(conn)
            .await
    }
}

//! Repository for the append-only `workflow_transitions` audit log.
//!
//! Rows are only ever inserted. `from_node_id` is NULL for same-node
//! completion events and initial activations.

use sqlx::{PgConnection, PgPool};

use oversight_core::types::DbId;

use crate::models::workflow::WorkflowTransition;

/// Column list for `workflow_transitions` queries.
const COLUMNS: &str = "id, instance_id, from_node_id, to_node_id, executor_id, comment, executed_at";

/// Provides append and read operations for the transition audit trail.
pub struct TransitionRepo;

impl TransitionRepo {
    /// Append one audit row inside a caller-owned transaction.
    pub async fn append(
        conn: &mut PgConnection,
        instance_id: DbId,
        from_node_id: Option<&str>,
        to_node_id: &str,
        executor_id: Option<DbId>,
        comment: &str,
    ) -> Result<WorkflowTransition, sqlx::Error> {
        let query = format!(
            "INSERT INTO workflow_transitions
                (instance_id, from_node_id, to_node_id, executor_id, comment)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkflowTransition>(&query)
            .bind(instance_id)
            .bind(from_node_id)
            .bind(to_node_id)
            .bind(executor_id)
            .bind(comment)
            .fetch_one(conn)
            .await
    }

    /// The full audit trail of an instance, oldest first.
    pub async fn list_for_instance(
        pool: &PgPool,
        instance_id: DbId,
    ) -> Result<Vec<WorkflowTransition>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM workflow_transitions
             WHERE instance_id = $1
             ORDER BY executed_at, id"
        );
        sqlx::query_as::<_, WorkflowTransition>(&query)
            .bind(instance_id)
            .fetch_all(pool)
            .await
    }
}

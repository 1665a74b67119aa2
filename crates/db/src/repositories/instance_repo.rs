//! Repository for the `workflow_instances` table and the instance number
//! counter.
//!
//! Instance creation materializes one node row per template graph node in
//! the same transaction as the instance insert, so a failure partway
//! through leaves nothing behind.

use chrono::{NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};

use oversight_core::graph::TemplateGraph;
use oversight_core::numbering;
use oversight_core::status::InstanceStatus;
use oversight_core::types::DbId;

use crate::models::workflow::{
    CreateInstance, InstanceFilter, WorkflowInstance, WorkflowTemplate,
};

/// Column list for `workflow_instances` queries.
const COLUMNS: &str = "id, number, title, template_id, initiator_id, \
    business_id, business_type, status, start_time, end_time, \
    business_data, variables, priority, created_at, updated_at";

/// Shared WHERE clause for list/count.
/// $1 = keyword pattern, $2 = status, $3 = initiator, $4 = template, $5 = business_type.
const FILTER: &str = "($1::text IS NULL OR title ILIKE $1 OR number ILIKE $1) \
    AND ($2::workflow_status IS NULL OR status = $2) \
    AND ($3::bigint IS NULL OR initiator_id = $3) \
    AND ($4::bigint IS NULL OR template_id = $4) \
    AND ($5::text IS NULL OR business_type = $5)";

/// Provides CRUD operations for workflow instances.
pub struct InstanceRepo;

impl InstanceRepo {
    /// Create an instance from a template, materializing its node rows.
    ///
    /// Allocates the instance number atomically, inserts the instance in
    /// DRAFT status, and inserts one PENDING node row per graph node with
    /// assignment fields copied verbatim. All of it runs in one transaction.
    pub async fn create(
        pool: &PgPool,
        template: &WorkflowTemplate,
        graph: &TemplateGraph,
        input: &CreateInstance,
        initiator_id: DbId,
    ) -> Result<WorkflowInstance, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let today = Utc::now().date_naive();
        let seq = Self::next_sequence(&mut tx, &template.code, today).await?;
        let number = numbering::instance_number(&template.code, today, seq);

        let insert_query = format!(
            "INSERT INTO workflow_instances
                (number, title, template_id, initiator_id, business_id,
                 business_type, business_data, variables, priority)
             VALUES ($1, $2, $3, $4, $5, $6, $7,
                     COALESCE($8, '{{}}'::jsonb), COALESCE($9, 1))
             RETURNING {COLUMNS}"
        );
        let instance = sqlx::query_as::<_, WorkflowInstance>(&insert_query)
            .bind(&number)
            .bind(&input.title)
            .bind(template.id)
            .bind(initiator_id)
            .bind(input.business_id)
            .bind(&input.business_type)
            .bind(&input.business_data)
            .bind(&input.variables)
            .bind(input.priority)
            .fetch_one(&mut *tx)
            .await?;

        for node in graph.nodes() {
            sqlx::query(
                "INSERT INTO workflow_nodes
                    (instance_id, node_id, name, node_type, node_data,
                     assignee_id, assignee_role_id, assignee_department_id)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(instance.id)
            .bind(&node.id)
            .bind(&node.name)
            .bind(node.node_type)
            .bind(&node.data)
            .bind(node.assignee_id)
            .bind(node.assignee_role_id)
            .bind(node.assignee_department_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(instance)
    }

    /// Atomically allocate the next per-(code, day) sequence number.
    pub async fn next_sequence(
        conn: &mut PgConnection,
        template_code: &str,
        day: NaiveDate,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO workflow_instance_counters (template_code, day, seq)
             VALUES ($1, $2, 1)
             ON CONFLICT (template_code, day)
             DO UPDATE SET seq = workflow_instance_counters.seq + 1
             RETURNING seq",
        )
        .bind(template_code)
        .bind(day)
        .fetch_one(conn)
        .await
    }

    /// Find an instance by its primary key.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<WorkflowInstance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workflow_instances WHERE id = $1");
        sqlx::query_as::<_, WorkflowInstance>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an instance inside a transaction, locking the row.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<WorkflowInstance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workflow_instances WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, WorkflowInstance>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List instances matching a filter, newest first, paginated.
    pub async fn list(
        pool: &PgPool,
        filter: &InstanceFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WorkflowInstance>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM workflow_instances
             WHERE {FILTER}
             ORDER BY created_at DESC
             LIMIT $6 OFFSET $7"
        );
        sqlx::query_as::<_, WorkflowInstance>(&query)
            .bind(keyword_pattern(filter))
            .bind(filter.status)
            .bind(filter.initiator_id)
            .bind(filter.template_id)
            .bind(&filter.business_type)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count instances matching a filter.
    pub async fn count(pool: &PgPool, filter: &InstanceFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM workflow_instances WHERE {FILTER}");
        sqlx::query_scalar(&query)
            .bind(keyword_pattern(filter))
            .bind(filter.status)
            .bind(filter.initiator_id)
            .bind(filter.template_id)
            .bind(&filter.business_type)
            .fetch_one(pool)
            .await
    }

    /// Count instances of a template that are not yet terminal
    /// (draft, active, or suspended). Non-zero blocks template deletion.
    pub async fn count_non_terminal_for_template(
        pool: &PgPool,
        template_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM workflow_instances
             WHERE template_id = $1
               AND status NOT IN ('completed', 'terminated')",
        )
        .bind(template_id)
        .fetch_one(pool)
        .await
    }

    /// Move a DRAFT instance to ACTIVE and stamp its start time.
    /// Returns `true` if the row was in DRAFT and was updated.
    pub async fn mark_active(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE workflow_instances
             SET status = 'active', start_time = NOW(), updated_at = NOW()
             WHERE id = $1 AND status = 'draft'",
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark an instance COMPLETED and stamp its end time.
    pub async fn mark_completed(conn: &mut PgConnection, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE workflow_instances
             SET status = 'completed', end_time = NOW(), updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Current status of an instance, if it exists.
    pub async fn status(pool: &PgPool, id: DbId) -> Result<Option<InstanceStatus>, sqlx::Error> {
        sqlx::query_scalar("SELECT status FROM workflow_instances WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

fn keyword_pattern(filter: &InstanceFilter) -> Option<String> {
    filter.keyword.as_ref().map(|k| format!("%{k}%"))
}

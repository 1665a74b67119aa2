//! Aggregate counting queries for the workflow statistics endpoint.

use sqlx::PgPool;

use crate::models::workflow::WorkflowStats;

/// Provides the workflow summary counts.
pub struct StatsRepo;

impl StatsRepo {
    /// Compute the aggregate workflow counts in one round trip.
    ///
    /// "Pending tasks" are PENDING/ACTIVE nodes of ACTIVE instances;
    /// "overdue" additionally requires a deadline in the past.
    pub async fn workflow_stats(pool: &PgPool) -> Result<WorkflowStats, sqlx::Error> {
        sqlx::query_as::<_, WorkflowStats>(
            "SELECT
                (SELECT COUNT(*) FROM workflow_templates) AS total_templates,
                (SELECT COUNT(*) FROM workflow_templates WHERE is_enabled) AS active_templates,
                (SELECT COUNT(*) FROM workflow_instances) AS total_instances,
                (SELECT COUNT(*) FROM workflow_instances WHERE status = 'active')
                    AS running_instances,
                (SELECT COUNT(*) FROM workflow_instances WHERE status = 'completed')
                    AS completed_instances,
                (SELECT COUNT(*) FROM workflow_nodes n
                    JOIN workflow_instances i ON i.id = n.instance_id
                    WHERE i.status = 'active' AND n.status IN ('pending', 'active'))
                    AS pending_tasks,
                (SELECT COUNT(*) FROM workflow_nodes n
                    JOIN workflow_instances i ON i.id = n.instance_id
                    WHERE i.status = 'active' AND n.status IN ('pending', 'active')
                      AND n.deadline IS NOT NULL AND n.deadline < NOW())
                    AS overdue_tasks",
        )
        .fetch_one(pool)
        .await
    }
}

//! Aggregate workflow statistics.

use oversight_db::models::workflow::WorkflowStats;
use oversight_db::repositories::StatsRepo;

use crate::service::WorkflowService;
use crate::WorkflowResult;

impl WorkflowService {
    /// Summary counts for dashboards: templates (total/enabled),
    /// instances (total/running/completed), and pending/overdue tasks.
    pub async fn workflow_stats(&self) -> WorkflowResult<WorkflowStats> {
        Ok(StatsRepo::workflow_stats(&self.pool).await?)
    }
}

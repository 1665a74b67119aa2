//! Instance manager: creation, start, and listing.

use oversight_core::error::CoreError;
use oversight_core::status::InstanceStatus;
use oversight_core::types::DbId;
use oversight_db::models::workflow::{
    CreateInstance, InstanceDetail, InstanceFilter, WorkflowInstance,
};
use oversight_db::repositories::{InstanceRepo, NodeRepo, TemplateRepo, TransitionRepo};

use crate::service::{Page, WorkflowService};
use crate::{WorkflowError, WorkflowResult};

impl WorkflowService {
    /// Create an instance of a template.
    ///
    /// Fails with `NotFound` when the template is missing. The instance
    /// row (DRAFT) and one PENDING node row per graph node are inserted
    /// in a single transaction, with an atomically allocated number
    /// `{code}{YYYYMMDD}{seq:04}`.
    pub async fn create_instance(
        &self,
        input: &CreateInstance,
        initiator_id: DbId,
    ) -> WorkflowResult<WorkflowInstance> {
        let template = TemplateRepo::find_by_id(&self.pool, input.template_id)
            .await?
            .ok_or_else(|| -> WorkflowError {
                CoreError::NotFound {
                    entity: "WorkflowTemplate",
                    id: input.template_id,
                }
                .into()
            })?;

        let graph = self.graph_for(&template)?;
        let instance =
            InstanceRepo::create(&self.pool, &template, &graph, input, initiator_id).await?;

        tracing::info!(
            instance = instance.id,
            number = %instance.number,
            template = template.id,
            nodes = graph.len(),
            "instance created"
        );
        Ok(instance)
    }

    /// Start a DRAFT instance.
    ///
    /// Moves the instance to ACTIVE, activates its START nodes, and runs
    /// one auto-flow pass seeded with them, all in one transaction.
    /// Fails with `InvalidState` unless the instance is in DRAFT.
    pub async fn start_instance(&self, instance_id: DbId, actor_id: DbId) -> WorkflowResult<bool> {
        let mut tx = self.pool.begin().await?;

        let instance = InstanceRepo::find_for_update(&mut tx, instance_id)
            .await?
            .ok_or_else(|| -> WorkflowError {
                CoreError::NotFound {
                    entity: "WorkflowInstance",
                    id: instance_id,
                }
                .into()
            })?;

        if instance.status != InstanceStatus::Draft {
            return Err(CoreError::InvalidState(format!(
                "only DRAFT instances can be started (instance {instance_id} is {:?})",
                instance.status
            ))
            .into());
        }

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

        InstanceRepo::mark_active(&mut tx, instance_id).await?;
        let start_nodes = NodeRepo::activate_start_nodes(&mut tx, instance_id).await?;
        for node in &start_nodes {
            TransitionRepo::append(
                &mut tx,
                instance_id,
                None,
                &node.node_id,
                Some(actor_id),
                "instance started",
            )
            .await?;
        }

        let mut outcome = self
            .auto_flow(&mut tx, &graph, &instance, &start_nodes, actor_id)
            .await?;
        tx.commit().await?;

        // Start nodes themselves were activated too; include them in the
        // post-commit notification pass.
        outcome.activated.splice(0..0, start_nodes);
        self.emit(&outcome).await;

        tracing::info!(instance = instance_id, "instance started");
        Ok(true)
    }

    /// Fetch an instance by id.
    pub async fn get_instance(&self, id: DbId) -> WorkflowResult<WorkflowInstance> {
        InstanceRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound {
                    entity: "WorkflowInstance",
                    id,
                }
                .into()
            })
    }

    /// Fetch an instance with its node rows and audit trail.
    pub async fn get_instance_detail(&self, id: DbId) -> WorkflowResult<InstanceDetail> {
        let instance = self.get_instance(id).await?;
        let nodes = NodeRepo::list_for_instance(&self.pool, id).await?;
        let transitions = TransitionRepo::list_for_instance(&self.pool, id).await?;
        Ok(InstanceDetail {
            instance,
            nodes,
            transitions,
        })
    }

    /// List instances matching a filter, newest first.
    pub async fn list_instances(
        &self,
        filter: &InstanceFilter,
        limit: Option<i64>,
        offset: i64,
    ) -> WorkflowResult<Page<WorkflowInstance>> {
        let limit = Self::clamp_limit(limit);
        let items = InstanceRepo::list(&self.pool, filter, limit, offset).await?;
        let total = InstanceRepo::count(&self.pool, filter).await?;
        Ok(Page { items, total })
    }
}

//! Template management operations.

use oversight_core::error::CoreError;
use oversight_core::graph::TemplateGraph;
use oversight_core::types::DbId;
use oversight_db::models::workflow::{
    CreateTemplate, TemplateFilter, UpdateTemplate, WorkflowTemplate,
};
use oversight_db::repositories::{InstanceRepo, TemplateRepo};

use crate::service::{Page, WorkflowService};
use crate::{WorkflowError, WorkflowResult};

impl WorkflowService {
    /// Create a workflow template.
    ///
    /// The definition must parse into a valid graph (duplicate node ids
    /// are rejected). Fails with `Conflict` when the code is taken; the
    /// unique constraint backs the pre-check against racing creators.
    pub async fn create_template(
        &self,
        input: &CreateTemplate,
        created_by: DbId,
    ) -> WorkflowResult<WorkflowTemplate> {
        TemplateGraph::parse(&input.definition)?;

        if TemplateRepo::find_by_code(&self.pool, &input.code)
            .await?
            .is_some()
        {
            return Err(duplicate_code(&input.code));
        }

        let template = TemplateRepo::create(&self.pool, input, created_by)
            .await
            .map_err(|err| map_unique_violation(err, &input.code))?;

        tracing::info!(template = template.id, code = %template.code, "template created");
        Ok(template)
    }

    /// Fetch a template by id.
    pub async fn get_template(&self, id: DbId) -> WorkflowResult<WorkflowTemplate> {
        TemplateRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| template_not_found(id))
    }

    /// Fetch a template by its unique code.
    pub async fn get_template_by_code(
        &self,
        code: &str,
    ) -> WorkflowResult<Option<WorkflowTemplate>> {
        Ok(TemplateRepo::find_by_code(&self.pool, code).await?)
    }

    /// List templates matching a filter, newest first.
    pub async fn list_templates(
        &self,
        filter: &TemplateFilter,
        limit: Option<i64>,
        offset: i64,
    ) -> WorkflowResult<Page<WorkflowTemplate>> {
        let limit = Self::clamp_limit(limit);
        let items = TemplateRepo::list(&self.pool, filter, limit, offset).await?;
        let total = TemplateRepo::count(&self.pool, filter).await?;
        Ok(Page { items, total })
    }

    /// Update a template.
    ///
    /// A replacement definition must parse. The cached graph is dropped
    /// so the next flow pass sees the new definition.
    pub async fn update_template(
        &self,
        id: DbId,
        input: &UpdateTemplate,
    ) -> WorkflowResult<WorkflowTemplate> {
        if let Some(definition) = &input.definition {
            TemplateGraph::parse(definition)?;
        }

        let template = TemplateRepo::update(&self.pool, id, input)
            .await?
            .ok_or_else(|| template_not_found(id))?;

        self.graphs.invalidate(id);
        tracing::info!(template = id, "template updated");
        Ok(template)
    }

    /// Delete a template.
    ///
    /// Rejected while any instance of the template is still in a
    /// non-terminal status (draft, active, or suspended). Terminal
    /// instances are removed with the template, node and audit rows
    /// included.
    pub async fn delete_template(&self, id: DbId) -> WorkflowResult<()> {
        let running = InstanceRepo::count_non_terminal_for_template(&self.pool, id).await?;
        if running > 0 {
            return Err(CoreError::InvalidState(format!(
                "cannot delete template {id}: {running} instance(s) still running"
            ))
            .into());
        }

        if !TemplateRepo::delete(&self.pool, id).await? {
            return Err(template_not_found(id));
        }

        self.graphs.invalidate(id);
        tracing::info!(template = id, "template deleted");
        Ok(())
    }
}

fn template_not_found(id: DbId) -> WorkflowError {
    CoreError::NotFound {
        entity: "WorkflowTemplate",
        id,
    }
    .into()
}

fn duplicate_code(code: &str) -> WorkflowError {
    CoreError::Conflict(format!("template code '{code}' already exists")).into()
}

/// Translate a `uq_workflow_templates_code` unique violation (PostgreSQL
/// error 23505) into the domain conflict error; pass everything else on.
fn map_unique_violation(err: sqlx::Error, code: &str) -> WorkflowError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505")
            && db_err.constraint() == Some("uq_workflow_templates_code")
        {
            return duplicate_code(code);
        }
    }
    err.into()
}

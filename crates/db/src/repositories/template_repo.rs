//! Repository for the `workflow_templates` table.

use sqlx::PgPool;

use oversight_core::types::DbId;

use crate::models::workflow::{CreateTemplate, TemplateFilter, UpdateTemplate, WorkflowTemplate};

/// Column list for `workflow_templates` queries.
const COLUMNS: &str = "id, name, code, description, template_type, version, \
    is_enabled, is_builtin, definition, form_config, permission_config, \
    notification_config, sort_order, created_by, created_at, updated_at";

/// Shared WHERE clause for list/count so the two stay in agreement.
/// $1 = keyword pattern, $2 = template_type, $3 = is_enabled.
const FILTER: &str = "($1::text IS NULL \
        OR name ILIKE $1 OR code ILIKE $1 OR description ILIKE $1) \
    AND ($2::text IS NULL OR template_type = $2) \
    AND ($3::boolean IS NULL OR is_enabled = $3)";

/// Provides CRUD operations for workflow templates.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert a new template, returning the created row.
    ///
    /// The unique constraint `uq_workflow_templates_code` backs duplicate
    /// detection; callers translate that violation into a conflict error.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTemplate,
        created_by: DbId,
    ) -> Result<WorkflowTemplate, sqlx::Error> {
        let query = format!(
            "INSERT INTO workflow_templates
                (name, code, description, template_type, version, is_enabled,
                 definition, form_config, permission_config, notification_config, created_by)
             VALUES ($1, $2, $3, $4, COALESCE($5, '1.0'), COALESCE($6, true),
                     $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkflowTemplate>(&query)
            .bind(&input.name)
            .bind(&input.code)
            .bind(&input.description)
            .bind(&input.template_type)
            .bind(&input.version)
            .bind(input.is_enabled)
            .bind(&input.definition)
            .bind(&input.form_config)
            .bind(&input.permission_config)
            .bind(&input.notification_config)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a template by its primary key.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<WorkflowTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workflow_templates WHERE id = $1");
        sqlx::query_as::<_, WorkflowTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a template by its unique code.
    pub async fn find_by_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<WorkflowTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workflow_templates WHERE code = $1");
        sqlx::query_as::<_, WorkflowTemplate>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// List templates matching a filter, newest first, paginated.
    pub async fn list(
        pool: &PgPool,
        filter: &TemplateFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WorkflowTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM workflow_templates
             WHERE {FILTER}
             ORDER BY created_at DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, WorkflowTemplate>(&query)
            .bind(keyword_pattern(filter))
            .bind(&filter.template_type)
            .bind(filter.is_enabled)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count templates matching a filter.
    pub async fn count(pool: &PgPool, filter: &TemplateFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM workflow_templates WHERE {FILTER}");
        sqlx::query_scalar(&query)
            .bind(keyword_pattern(filter))
            .bind(&filter.template_type)
            .bind(filter.is_enabled)
            .fetch_one(pool)
            .await
    }

    /// Update a template with the provided fields, returning the updated row.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTemplate,
    ) -> Result<Option<WorkflowTemplate>, sqlx::Error> {
        let query = format!(
            "UPDATE workflow_templates SET
                name = COALESCE($1, name),
                description = COALESCE($2, description),
                version = COALESCE($3, version),
                is_enabled = COALESCE($4, is_enabled),
                definition = COALESCE($5, definition),
                form_config = COALESCE($6, form_config),
                permission_config = COALESCE($7, permission_config),
                notification_config = COALESCE($8, notification_config),
                sort_order = COALESCE($9, sort_order),
                updated_at = NOW()
             WHERE id = $10
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkflowTemplate>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.version)
            .bind(input.is_enabled)
            .bind(&input.definition)
            .bind(&input.form_config)
            .bind(&input.permission_config)
            .bind(&input.notification_config)
            .bind(input.sort_order)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a template by its ID. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM workflow_templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn keyword_pattern(filter: &TemplateFilter) -> Option<String> {
    filter.keyword.as_ref().map(|k| format!("%{k}%"))
}

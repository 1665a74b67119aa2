//! Repository for the `departments` table.

use sqlx::PgPool;

use oversight_core::types::DbId;

use crate::models::directory::{CreateDepartment, Department};

/// Column list for `departments` queries.
const COLUMNS: &str = "id, name, code, is_enabled, created_at, updated_at";

/// Provides lookup and seeding operations for departments.
pub struct DepartmentRepo;

impl DepartmentRepo {
    /// Insert a new department, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateDepartment) -> Result<Department, sqlx::Error> {
        let query = format!(
            "INSERT INTO departments (name, code)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Department>(&query)
            .bind(&input.name)
            .bind(&input.code)
            .fetch_one(pool)
            .await
    }

    /// Find a department by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Department>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM departments WHERE id = $1");
        sqlx::query_as::<_, Department>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a department by its unique code.
    pub async fn find_by_code(pool: &PgPool, code: &str) -> Result<Option<Department>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM departments WHERE code = $1");
        sqlx::query_as::<_, Department>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }
}

//! Repository for the `users` and `user_roles` tables.
//!
//! Besides row CRUD this exposes [`UserRepo::actor_context`], the directory
//! lookup the engine uses to answer "may this user act on that node":
//! the user's id, role-id set, and department.

use sqlx::PgPool;

use oversight_core::assignee::ActorContext;
use oversight_core::types::DbId;

use crate::models::directory::{CreateUser, User};

/// Column list for `users` queries.
const COLUMNS: &str =
    "id, username, display_name, email, department_id, is_enabled, created_at, updated_at";

/// Provides directory operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, display_name, email, department_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.display_name)
            .bind(&input.email)
            .bind(input.department_id)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Grant a role to a user. Granting an already-held role is a no-op.
    pub async fn assign_role(pool: &PgPool, user_id: DbId, role_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id)
             VALUES ($1, $2)
             ON CONFLICT (user_id, role_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(role_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// The ids of all roles held by a user.
    pub async fn role_ids(pool: &PgPool, user_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT role_id FROM user_roles WHERE user_id = $1 ORDER BY role_id")
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Resolve the assignment-relevant facts about a user.
    ///
    /// Returns `None` when the user does not exist.
    pub async fn actor_context(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<ActorContext>, sqlx::Error> {
        let Some(user) = Self::find_by_id(pool, user_id).await? else {
            return Ok(None);
        };
        let role_ids = Self::role_ids(pool, user_id).await?;
        Ok(Some(ActorContext {
            user_id: user.id,
            role_ids,
            department_id: user.department_id,
        }))
    }
}

//! Shared fixtures for engine integration tests.
#![allow(dead_code)]

use serde_json::json;
use sqlx::PgPool;

use oversight_core::types::DbId;
use oversight_db::models::directory::{CreateDepartment, CreateRole, CreateUser, Department, Role, User};
use oversight_db::models::workflow::{CreateInstance, CreateTemplate, WorkflowTemplate};
use oversight_db::repositories::{DepartmentRepo, RoleRepo, UserRepo};
use oversight_workflow::WorkflowService;

pub async fn seed_department(pool: &PgPool, code: &str) -> Department {
    DepartmentRepo::create(
        pool,
        &CreateDepartment {
            name: format!("Department {code}"),
            code: code.to_string(),
        },
    )
    .await
    .expect("create department")
}

pub async fn seed_role(pool: &PgPool, code: &str) -> Role {
    RoleRepo::create(
        pool,
        &CreateRole {
            name: format!("Role {code}"),
            code: code.to_string(),
        },
    )
    .await
    .expect("create role")
}

pub async fn seed_user(pool: &PgPool, username: &str, department_id: Option<DbId>) -> User {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            display_name: username.to_string(),
            email: None,
            department_id,
        },
    )
    .await
    .expect("create user")
}

/// start -> task1 -> end, with task1 assigned as given.
pub fn linear_definition(task_assignee: serde_json::Value) -> serde_json::Value {
    let mut task = json!({"id": "task1", "name": "Review", "type": "task"});
    for (k, v) in task_assignee.as_object().expect("assignee object") {
        task[k] = v.clone();
    }
    json!({
        "nodes": [
            {"id": "start", "name": "Start", "type": "start"},
            task,
            {"id": "end", "name": "End", "type": "end"}
        ],
        "transitions": [
            {"from": "start", "to": "task1"},
            {"from": "task1", "to": "end", "name": "finish"}
        ]
    })
}

pub fn template_input(code: &str, definition: serde_json::Value) -> CreateTemplate {
    CreateTemplate {
        name: format!("Template {code}"),
        code: code.to_string(),
        description: None,
        template_type: "supervision".to_string(),
        version: None,
        is_enabled: None,
        definition,
        form_config: None,
        permission_config: None,
        notification_config: None,
    }
}

pub fn instance_input(template_id: DbId, title: &str) -> CreateInstance {
    CreateInstance {
        template_id,
        title: title.to_string(),
        business_id: None,
        business_type: None,
        business_data: None,
        variables: None,
        priority: None,
    }
}

/// Seed one user and a linear template whose task is assigned to them.
pub async fn linear_setup(pool: &PgPool, code: &str) -> (WorkflowService, User, WorkflowTemplate) {
    let service = WorkflowService::new(pool.clone());
    let user = seed_user(pool, &format!("user_{code}"), None).await;
    let template = service
        .create_template(
            &template_input(code, linear_definition(json!({"assignee_id": user.id}))),
            user.id,
        )
        .await
        .expect("create template");
    (service, user, template)
}

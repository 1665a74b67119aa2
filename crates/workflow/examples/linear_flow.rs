//! End-to-end walkthrough: define a linear template, run one instance
//! through it, and print the audit trail.
//!
//! Requires `DATABASE_URL` (a `.env` file works):
//!
//! ```text
//! cargo run -p oversight-workflow --example linear_flow
//! ```

use serde_json::json;
use tracing_subscriber::EnvFilter;

use oversight_db::models::directory::CreateUser;
use oversight_db::models::workflow::{CreateInstance, CreateTemplate};
use oversight_db::repositories::UserRepo;
use oversight_workflow::WorkflowService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = oversight_db::DbConfig::from_env();
    let pool = oversight_db::create_pool_with_config(&config).await?;
    oversight_db::run_migrations(&pool).await?;

    let service = WorkflowService::new(pool.clone());

    let operator = match UserRepo::find_by_username(&pool, "demo_operator").await? {
        Some(user) => user,
        None => {
            UserRepo::create(
                &pool,
                &CreateUser {
                    username: "demo_operator".to_string(),
                    display_name: "Demo Operator".to_string(),
                    email: None,
                    department_id: None,
                },
            )
            .await?
        }
    };

    let template = match service.get_template_by_code("demo_linear").await? {
        Some(template) => template,
        None => {
            service
                .create_template(
                    &CreateTemplate {
                        name: "Demo linear flow".to_string(),
                        code: "demo_linear".to_string(),
                        description: Some("start -> review -> end".to_string()),
                        template_type: "supervision".to_string(),
                        version: None,
                        is_enabled: None,
                        definition: json!({
                            "nodes": [
                                {"id": "start", "name": "Start", "type": "start"},
                                {"id": "review", "name": "Review", "type": "task",
                                 "assignee_id": operator.id},
                                {"id": "end", "name": "End", "type": "end"}
                            ],
                            "transitions": [
                                {"from": "start", "to": "review"},
                                {"from": "review", "to": "end", "name": "approved"}
                            ]
                        }),
                        form_config: None,
                        permission_config: None,
                        notification_config: None,
                    },
                    operator.id,
                )
                .await?
        }
    };

    let instance = service
        .create_instance(
            &CreateInstance {
                template_id: template.id,
                title: "Demo run".to_string(),
                business_id: None,
                business_type: None,
                business_data: None,
                variables: None,
                priority: None,
            },
            operator.id,
        )
        .await?;
    service.start_instance(instance.id, operator.id).await?;

    let tasks = service.list_user_tasks(operator.id, None, None, 0).await?;
    for task in &tasks.items {
        service
            .complete_task(task.id, operator.id, Some(json!({"verdict": "ok"})), Some("demo"))
            .await?;
    }

    let detail = service.get_instance_detail(instance.id).await?;
    println!("instance {} -> {:?}", detail.instance.number, detail.instance.status);
    for step in &detail.transitions {
        println!(
            "  {} -> {} ({})",
            step.from_node_id.as_deref().unwrap_or("·"),
            step.to_node_id,
            step.comment.as_deref().unwrap_or("")
        );
    }

    let stats = service.workflow_stats().await?;
    println!(
        "templates: {} ({} enabled), instances: {} ({} running, {} completed)",
        stats.total_templates,
        stats.active_templates,
        stats.total_instances,
        stats.running_instances,
        stats.completed_instances
    );
    Ok(())
}

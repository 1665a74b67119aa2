//! Aggregate statistics.

mod common;

use sqlx::PgPool;

use oversight_db::models::workflow::UpdateTemplate;

use common::{instance_input, linear_setup};

#[sqlx::test(migrations = "../../db/migrations")]
async fn stats_reflect_engine_activity(pool: PgPool) {
    let (service, user, template) = linear_setup(&pool, "wf_stats").await;

    let empty = service.workflow_stats().await.unwrap();
    assert_eq!(empty.total_templates, 1);
    assert_eq!(empty.active_templates, 1);
    assert_eq!(empty.total_instances, 0);
    assert_eq!(empty.pending_tasks, 0);

    // One draft, one running, one completed instance.
    service
        .create_instance(&instance_input(template.id, "Draft"), user.id)
        .await
        .unwrap();

    let running = service
        .create_instance(&instance_input(template.id, "Running"), user.id)
        .await
        .unwrap();
    service.start_instance(running.id, user.id).await.unwrap();

    let finished = service
        .create_instance(&instance_input(template.id, "Finished"), user.id)
        .await
        .unwrap();
    service.start_instance(finished.id, user.id).await.unwrap();
    let task = service
        .get_instance_detail(finished.id)
        .await
        .unwrap()
        .nodes
        .into_iter()
        .find(|n| n.node_id == "task1")
        .unwrap();
    service
        .complete_task(task.id, user.id, None, None)
        .await
        .unwrap();

    let stats = service.workflow_stats().await.unwrap();
    assert_eq!(stats.total_templates, 1);
    assert_eq!(stats.total_instances, 3);
    assert_eq!(stats.running_instances, 1);
    assert_eq!(stats.completed_instances, 1);
    // The running instance has its start node ACTIVE, task1 ACTIVE, and
    // end PENDING.
    assert_eq!(stats.pending_tasks, 3);
    assert_eq!(stats.overdue_tasks, 0);

    service
        .update_template(
            template.id,
            &UpdateTemplate {
                is_enabled: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let stats = service.workflow_stats().await.unwrap();
    assert_eq!(stats.active_templates, 0);
}

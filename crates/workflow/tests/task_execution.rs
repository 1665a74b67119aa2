//! Task listing and completion, including the permission and status guards.

mod common;

use assert_matches::assert_matches;
use serde_json::json;
use sqlx::PgPool;

use oversight_core::error::CoreError;
use oversight_core::status::{InstanceStatus, NodeStatus};
use oversight_db::models::workflow::WorkflowNode;
use oversight_db::repositories::UserRepo;
use oversight_workflow::{WorkflowError, WorkflowService};

use common::{
    instance_input, linear_definition, linear_setup, seed_department, seed_role, seed_user,
    template_input,
};

async fn task_node(service: &WorkflowService, instance_id: i64) -> WorkflowNode {
    service
        .get_instance_detail(instance_id)
        .await
        .unwrap()
        .nodes
        .into_iter()
        .find(|n| n.node_id == "task1")
        .expect("task node")
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn completing_a_task_advances_the_flow(pool: PgPool) {
    let (service, user, template) = linear_setup(&pool, "wf_done").await;
    let instance = service
        .create_instance(&instance_input(template.id, "Review run"), user.id)
        .await
        .unwrap();
    service.start_instance(instance.id, user.id).await.unwrap();

    let task = task_node(&service, instance.id).await;
    assert!(service
        .complete_task(
            task.id,
            user.id,
            Some(json!({"result": "approved"})),
            Some("looks good"),
        )
        .await
        .unwrap());

    let detail = service.get_instance_detail(instance.id).await.unwrap();
    let task = detail.nodes.iter().find(|n| n.node_id == "task1").unwrap();
    assert_eq!(task.status, NodeStatus::Completed);
    assert_eq!(task.processor_id, Some(user.id));
    assert_eq!(task.form_data, Some(json!({"result": "approved"})));
    assert_eq!(task.comment.as_deref(), Some("looks good"));
    assert!(task.complete_time.is_some());

    // Reaching the END node completed the instance.
    assert_eq!(detail.instance.status, InstanceStatus::Completed);
    assert!(detail.instance.end_time.is_some());

    let completion = detail
        .transitions
        .iter()
        .find(|t| t.from_node_id.is_none() && t.to_node_id == "task1")
        .expect("completion audit row");
    assert_eq!(completion.comment.as_deref(), Some("complete task: Review"));
    assert_eq!(completion.executor_id, Some(user.id));

    let finish = detail
        .transitions
        .iter()
        .find(|t| t.from_node_id.as_deref() == Some("task1"))
        .expect("traversal audit row");
    assert_eq!(finish.to_node_id, "end");
    assert_eq!(finish.comment.as_deref(), Some("finish"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn permission_checked_before_status(pool: PgPool) {
    let (service, assignee, template) = linear_setup(&pool, "wf_perm").await;
    let outsider = seed_user(&pool, "outsider", None).await;
    let instance = service
        .create_instance(&instance_input(template.id, "Guarded"), assignee.id)
        .await
        .unwrap();
    service
        .start_instance(instance.id, assignee.id)
        .await
        .unwrap();
    let task = task_node(&service, instance.id).await;

    let err = service
        .complete_task(task.id, outsider.id, None, None)
        .await
        .unwrap_err();
    assert_matches!(err, WorkflowError::Core(CoreError::PermissionDenied(_)));

    service
        .complete_task(task.id, assignee.id, None, None)
        .await
        .unwrap();

    // Still denied after completion: a non-assignee never learns the
    // node's state.
    let err = service
        .complete_task(task.id, outsider.id, None, None)
        .await
        .unwrap_err();
    assert_matches!(err, WorkflowError::Core(CoreError::PermissionDenied(_)));

    // The assignee, by contrast, gets the status error.
    let err = service
        .complete_task(task.id, assignee.id, None, None)
        .await
        .unwrap_err();
    assert_matches!(err, WorkflowError::Core(CoreError::InvalidState(_)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn completion_rejects_unknown_node_and_actor(pool: PgPool) {
    let (service, user, template) = linear_setup(&pool, "wf_miss").await;
    let instance = service
        .create_instance(&instance_input(template.id, "Missing"), user.id)
        .await
        .unwrap();
    service.start_instance(instance.id, user.id).await.unwrap();
    let task = task_node(&service, instance.id).await;

    let err = service
        .complete_task(task.id + 999, user.id, None, None)
        .await
        .unwrap_err();
    assert_matches!(err, WorkflowError::Core(CoreError::NotFound { entity: "WorkflowNode", .. }));

    let err = service
        .complete_task(task.id, user.id + 999, None, None)
        .await
        .unwrap_err();
    assert_matches!(err, WorkflowError::Core(CoreError::NotFound { entity: "User", .. }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn tasks_listed_for_direct_assignee_only_when_active(pool: PgPool) {
    let (service, user, template) = linear_setup(&pool, "wf_mine").await;
    let instance = service
        .create_instance(&instance_input(template.id, "My work"), user.id)
        .await
        .unwrap();

    // Draft instance: nothing to act on yet.
    let page = service
        .list_user_tasks(user.id, None, None, 0)
        .await
        .unwrap();
    assert_eq!(page.total, 0);

    service.start_instance(instance.id, user.id).await.unwrap();

    let page = service
        .list_user_tasks(user.id, None, None, 0)
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].node_id, "task1");
    assert_eq!(page.items[0].status, NodeStatus::Active);

    // Completed tasks drop out of the default (pending/active) view but
    // show up under an explicit filter.
    service
        .complete_task(page.items[0].id, user.id, None, None)
        .await
        .unwrap();
    let page = service
        .list_user_tasks(user.id, None, None, 0)
        .await
        .unwrap();
    assert_eq!(page.total, 0);
    let done = service
        .list_user_tasks(user.id, Some(vec![NodeStatus::Completed]), None, 0)
        .await
        .unwrap();
    // The instance completed with the task, so its nodes are off the
    // active-instance task list entirely.
    assert_eq!(done.total, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn tasks_reach_role_and_department_members(pool: PgPool) {
    let service = WorkflowService::new(pool.clone());
    let department = seed_department(&pool, "audit").await;
    let role = seed_role(&pool, "reviewer").await;

    let initiator = seed_user(&pool, "initiator", None).await;
    let role_holder = seed_user(&pool, "role_holder", None).await;
    UserRepo::assign_role(&pool, role_holder.id, role.id)
        .await
        .unwrap();
    let dept_member = seed_user(&pool, "dept_member", Some(department.id)).await;
    let bystander = seed_user(&pool, "bystander", None).await;

    let by_role = service
        .create_template(
            &template_input("wf_role", linear_definition(json!({"assignee_role_id": role.id}))),
            initiator.id,
        )
        .await
        .unwrap();
    let by_dept = service
        .create_template(
            &template_input(
                "wf_dept",
                linear_definition(json!({"assignee_department_id": department.id})),
            ),
            initiator.id,
        )
        .await
        .unwrap();

    for template_id in [by_role.id, by_dept.id] {
        let instance = service
            .create_instance(&instance_input(template_id, "Shared work"), initiator.id)
            .await
            .unwrap();
        service
            .start_instance(instance.id, initiator.id)
            .await
            .unwrap();
    }

    let role_tasks = service
        .list_user_tasks(role_holder.id, None, None, 0)
        .await
        .unwrap();
    assert_eq!(role_tasks.total, 1);
    assert_eq!(role_tasks.items[0].assignee_role_id, Some(role.id));

    let dept_tasks = service
        .list_user_tasks(dept_member.id, None, None, 0)
        .await
        .unwrap();
    assert_eq!(dept_tasks.total, 1);
    assert_eq!(
        dept_tasks.items[0].assignee_department_id,
        Some(department.id)
    );

    let none = service
        .list_user_tasks(bystander.id, None, None, 0)
        .await
        .unwrap();
    assert_eq!(none.total, 0);

    // A role holder may complete the role-assigned task.
    service
        .complete_task(role_tasks.items[0].id, role_holder.id, None, None)
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_user_gets_an_empty_page(pool: PgPool) {
    let service = WorkflowService::new(pool.clone());
    let page = service.list_user_tasks(424242, None, None, 0).await.unwrap();
    assert_eq!(page.total, 0);
    assert!(page.items.is_empty());
}

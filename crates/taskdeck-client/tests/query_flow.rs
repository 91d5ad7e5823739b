//! Query cache driven over a live HTTP transport.
//!
//! Each test spawns an in-process server, points an `HttpService` at it,
//! and works the cache the way a view layer would: provision the signed-in
//! user, observe queries, mutate, observe again.

use chrono::{TimeZone, Utc};
use taskdeck_client::{BoardController, QueryClient, TaskEditor};
use taskdeck_core::project::CreateProject;
use taskdeck_core::task::{CreateTask, Status, Task};
use taskdeck_core::user::CreateUser;
use taskdeck_service::HttpService;
use taskdeck_server::test_helpers::spawn_test_server;

const SUBJECT: &str = "cog-grace";

/// Spawns a server and provisions one user and one project through the
/// client, returning (client, user id, project id).
async fn signed_in_client() -> (QueryClient<HttpService>, i64, i64) {
    let server = spawn_test_server().await;
    let client = QueryClient::new(HttpService::new(&server.base_url));

    let profile = CreateUser {
        username: Some("grace".into()),
        cognito_id: Some(SUBJECT.into()),
        ..CreateUser::default()
    };
    let user = client.resolve_auth_user(SUBJECT, &profile).await.unwrap();

    let project = client
        .create_project(&CreateProject {
            name: Some("Apollo".into()),
            ..CreateProject::default()
        })
        .await
        .unwrap();

    (client, user.user_id, project.id)
}

async fn make_task(
    client: &QueryClient<HttpService>,
    project_id: i64,
    title: &str,
    status: Status,
) -> Task {
    client
        .create_task(&CreateTask {
            title: Some(title.into()),
            status: Some(status),
            project_id: Some(project_id),
            author_user_id: Some(SUBJECT.into()),
            ..CreateTask::default()
        })
        .await
        .unwrap()
}

// ---- Board over HTTP ----

#[tokio::test]
async fn board_groups_live_tasks_and_reflects_moves() {
    let (client, _, project_id) = signed_in_client().await;
    make_task(&client, project_id, "write docs", Status::ToDo).await;
    let moving = make_task(&client, project_id, "fix login", Status::ToDo).await;
    make_task(&client, project_id, "review PR", Status::UnderReview).await;
    make_task(&client, project_id, "ship v1", Status::Completed).await;

    let board = BoardController::new(&client, project_id);
    let view = board.view().await;
    let grouped = view.ready().expect("board should resolve");
    assert_eq!(grouped.count(Status::ToDo), 2);
    assert_eq!(grouped.count(Status::WorkInProgress), 0);
    assert_eq!(grouped.count(Status::UnderReview), 1);
    assert_eq!(grouped.count(Status::Completed), 1);

    let moved = board.move_task(moving.id, Status::WorkInProgress).await.unwrap();
    assert_eq!(moved.status, Status::WorkInProgress);

    let view = board.view().await;
    let grouped = view.ready().expect("board should resolve after move");
    assert_eq!(grouped.count(Status::ToDo), 1);
    assert_eq!(grouped.count(Status::WorkInProgress), 1);
}

#[tokio::test]
async fn deleting_a_task_empties_its_column() {
    let (client, _, project_id) = signed_in_client().await;
    let task = make_task(&client, project_id, "throwaway", Status::ToDo).await;

    let board = BoardController::new(&client, project_id);
    assert_eq!(board.view().await.ready().unwrap().count(Status::ToDo), 1);

    let ack = client.delete_task(task.id).await.unwrap();
    assert!(ack.success);
    assert_eq!(ack.id, task.id);

    assert_eq!(board.view().await.ready().unwrap().count(Status::ToDo), 0);
}

// ---- Editor over HTTP ----

#[tokio::test]
async fn edited_fields_round_trip_through_the_cache() {
    let (client, user_id, project_id) = signed_in_client().await;
    let task = make_task(&client, project_id, "draft spec", Status::ToDo).await;

    let mut editor = TaskEditor::new(&task);
    editor.set_title("draft spec v2");
    editor.set_due_date("2026-03-01");
    editor.set_assignee(user_id.to_string());
    assert!(editor.has_changes());

    let updated = client.edit_task(task.id, &editor.build_patch()).await.unwrap();
    editor.commit();
    assert!(!editor.has_changes());
    assert_eq!(updated.title, "draft spec v2");

    // The task's tag went stale; the next list observation re-fetches.
    let listed = client.tasks_by_project(project_id).await;
    let tasks = listed.ready().expect("task list should resolve");
    let found = tasks.iter().find(|t| t.id == task.id).unwrap();
    assert_eq!(found.title, "draft spec v2");
    assert_eq!(
        found.due_date,
        Some(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap())
    );
    assert_eq!(found.assigned_user_id, Some(user_id));
}

// ---- Directory and search ----

#[tokio::test]
async fn directory_and_search_queries_resolve() {
    let (client, _, project_id) = signed_in_client().await;
    make_task(&client, project_id, "login flow", Status::ToDo).await;

    let users = client.users().await;
    let users = users.ready().expect("users should resolve");
    assert!(users.iter().any(|u| u.username == "grace"));

    let results = client.search("login").await;
    let results = results.ready().expect("search should resolve");
    assert_eq!(results.tasks.len(), 1);
    assert!(results.projects.is_empty());

    assert!(!client.signed_out());
}

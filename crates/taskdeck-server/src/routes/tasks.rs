use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use taskdeck_core::task::{CreateTask, Status, UpdateTask};
use taskdeck_service::{ServiceError, TaskService};

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}", put(update_task).delete(delete_task))
        .route("/tasks/{id}/status", patch(update_task_status))
        .route("/tasks/user/{user_id}", get(list_user_tasks))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskQuery {
    project_id: Option<i64>,
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(q): Query<TaskQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let project_id = q.project_id.ok_or_else(|| {
        to_error(ServiceError::Validation(
            "projectId query parameter is required".into(),
        ))
    })?;
    state
        .service
        .list_tasks_by_project(project_id)
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}

async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<CreateTask>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    state
        .service
        .create_task(&input)
        .await
        .map(|t| (StatusCode::CREATED, Json(json!(t))))
        .map_err(to_error)
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: String,
}

async fn update_task_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let status = Status::parse_str(&body.status).ok_or_else(|| {
        to_error(ServiceError::Validation(format!(
            "unknown status {:?}",
            body.status
        )))
    })?;
    state
        .service
        .update_task_status(id, status)
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}

async fn list_user_tasks(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .list_tasks_by_user(user_id)
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateTask>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .edit_task(id, &input)
        .await
        .map(|t| Json(json!(t)))
        .map_err(to_error)
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    // The id arrives as a raw path segment so a non-numeric value can be
    // reported as bad input rather than an unmatched route.
    let id: i64 = id
        .parse()
        .map_err(|_| to_error(ServiceError::Validation(format!("invalid task id {id:?}"))))?;
    state
        .service
        .delete_task(id)
        .await
        .map(|d| Json(json!(d)))
        .map_err(to_error)
}

fn to_error(e: ServiceError) -> (StatusCode, Json<Value>) {
    let (status, msg) = match &e {
        ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
        ServiceError::Conflict(_) => (StatusCode::CONFLICT, e.to_string()),
        ServiceError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        ServiceError::Auth(_) => (StatusCode::UNAUTHORIZED, e.to_string()),
    };
    (status, Json(json!({ "error": msg })))
}

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use taskdeck_core::project::CreateProject;
use taskdeck_service::{ServiceError, TaskService};

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/projects", get(list_projects).post(create_project))
}

async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .list_projects()
        .await
        .map(|p| Json(json!(p)))
        .map_err(to_error)
}

async fn create_project(
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    state
        .service
        .create_project(&input)
        .await
        .map(|p| (StatusCode::CREATED, Json(json!(p))))
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

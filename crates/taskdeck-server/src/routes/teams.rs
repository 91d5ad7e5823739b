use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use taskdeck_service::{ServiceError, TaskService};

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/teams", get(list_teams))
}

async fn list_teams(State(state): State<AppState>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .list_teams()
        .await
        .map(|t| Json(json!(t)))
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

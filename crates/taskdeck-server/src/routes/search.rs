use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use taskdeck_service::{ServiceError, TaskService};

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/search", get(search))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    query: Option<String>,
}

async fn search(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let query = q.query.unwrap_or_default();
    state
        .service
        .search(&query)
        .await
        .map(|r| Json(json!(r)))
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

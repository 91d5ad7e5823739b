use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use taskdeck_core::user::CreateUser;
use taskdeck_service::{ServiceError, TaskService};

use super::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{cognito_id}", get(get_user))
}

async fn list_users(State(state): State<AppState>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .list_users()
        .await
        .map(|u| Json(json!(u)))
        .map_err(to_error)
}

async fn get_user(
    State(state): State<AppState>,
    Path(cognito_id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state
        .service
        .get_user(&cognito_id)
        .await
        .map(|u| Json(json!(u)))
        .map_err(to_error)
}

async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    match state.service.create_user(&input).await {
        Ok(user) => Ok((
            StatusCode::CREATED,
            Json(json!({ "message": "User Created Successfully", "user": user })),
        )),
        // Provisioning retries hit this path; answer with the existing row
        // so the caller can proceed with it.
        Err(ServiceError::Conflict(_)) => {
            let cognito_id = input.cognito_id.as_deref().unwrap_or_default();
            let existing = state
                .service
                .get_user(cognito_id)
                .await
                .map_err(to_error)?;
            Ok((
                StatusCode::CONFLICT,
                Json(json!({ "message": "User already exists", "user": existing })),
            ))
        }
        Err(e) => Err(to_error(e)),
    }
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

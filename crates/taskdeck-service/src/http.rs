use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use taskdeck_core::project::{CreateProject, Project};
use taskdeck_core::search::SearchResults;
use taskdeck_core::task::{CreateTask, DeletedTask, Status, Task, UpdateTask};
use taskdeck_core::team::Team;
use taskdeck_core::user::{CreateUser, User};

use crate::{ServiceError, TaskService};

/// Source of the bearer token attached to authenticated requests. Token
/// issuance lives with the external identity provider; implementations
/// hand back whatever the current session holds.
pub trait SessionProvider: Send + Sync {
    /// The current bearer token, or the reason the session is unusable.
    /// Failures surface to callers as `ServiceError::Auth`.
    fn bearer_token(&self) -> Result<String, String>;
}

/// Async HTTP client implementation of TaskService.
/// Connects to a running taskdeck-server.
pub struct HttpService {
    base_url: String,
    client: Client,
    session: Option<Arc<dyn SessionProvider>>,
}

impl HttpService {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
            session: None,
        }
    }

    pub fn with_session(base_url: &str, session: Arc<dyn SessionProvider>) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
            session: Some(session),
        }
    }

    fn with_auth(&self, builder: RequestBuilder) -> Result<RequestBuilder, ServiceError> {
        match &self.session {
            Some(session) => {
                let token = session.bearer_token().map_err(ServiceError::Auth)?;
                Ok(builder.header("Authorization", format!("Bearer {token}")))
            }
            None => Ok(builder),
        }
    }

    /// Check if the server is reachable.
    /// Health endpoint is NOT authenticated.
    pub async fn health_check(&self) -> Result<(), ServiceError> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Storage(format!("connection failed: {e}")))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ServiceError::Storage(format!(
                "health check failed: {}",
                resp.status()
            )))
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let builder = self.client.get(format!("{}{path}", self.base_url));
        let resp = self
            .with_auth(builder)?
            .send()
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        handle_response(resp).await
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let builder = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body);
        let resp = self
            .with_auth(builder)?
            .send()
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        handle_response(resp).await
    }

    async fn put_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let builder = self
            .client
            .put(format!("{}{path}", self.base_url))
            .json(body);
        let resp = self
            .with_auth(builder)?
            .send()
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        handle_response(resp).await
    }

    async fn patch_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let builder = self
            .client
            .patch(format!("{}{path}", self.base_url))
            .json(body);
        let resp = self
            .with_auth(builder)?
            .send()
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        handle_response(resp).await
    }

    async fn delete_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ServiceError> {
        let builder = self.client.delete(format!("{}{path}", self.base_url));
        let resp = self
            .with_auth(builder)?
            .send()
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        handle_response(resp).await
    }
}

/// The user-creation endpoint wraps its payload so a duplicate can carry
/// the existing row; unwrap to the user itself.
#[derive(serde::Deserialize)]
struct UserEnvelope {
    user: User,
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::Storage(format!("json decode: {e}")))
    } else {
        Err(parse_error_with_status(status, resp).await)
    }
}

async fn parse_error_with_status(status: StatusCode, resp: reqwest::Response) -> ServiceError {
    let body = resp.text().await.unwrap_or_default();
    let msg = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            v["error"]
                .as_str()
                .or_else(|| v["message"].as_str())
                .map(String::from)
        })
        .unwrap_or(body);

    if status == StatusCode::NOT_FOUND {
        ServiceError::NotFound(msg)
    } else if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
        ServiceError::Validation(msg)
    } else if status == StatusCode::CONFLICT {
        ServiceError::Conflict(msg)
    } else if status == StatusCode::UNAUTHORIZED {
        ServiceError::Auth(msg)
    } else {
        ServiceError::Storage(msg)
    }
}

#[async_trait]
impl TaskService for HttpService {
    async fn list_tasks_by_project(&self, project_id: i64) -> Result<Vec<Task>, ServiceError> {
        self.get_json(&format!("/tasks?projectId={project_id}"))
            .await
    }

    async fn list_tasks_by_user(&self, user_id: i64) -> Result<Vec<Task>, ServiceError> {
        self.get_json(&format!("/tasks/user/{user_id}")).await
    }

    async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError> {
        self.post_json("/tasks", input).await
    }

    async fn update_task_status(&self, id: i64, status: Status) -> Result<Task, ServiceError> {
        self.patch_json(
            &format!("/tasks/{id}/status"),
            &serde_json::json!({ "status": status }),
        )
        .await
    }

    async fn edit_task(&self, id: i64, update: &UpdateTask) -> Result<Task, ServiceError> {
        self.put_json(&format!("/tasks/{id}"), update).await
    }

    async fn delete_task(&self, id: i64) -> Result<DeletedTask, ServiceError> {
        self.delete_json(&format!("/tasks/{id}")).await
    }

    async fn list_projects(&self) -> Result<Vec<Project>, ServiceError> {
        self.get_json("/projects").await
    }

    async fn create_project(&self, input: &CreateProject) -> Result<Project, ServiceError> {
        self.post_json("/projects", input).await
    }

    async fn list_users(&self) -> Result<Vec<User>, ServiceError> {
        self.get_json("/users").await
    }

    async fn get_user(&self, cognito_id: &str) -> Result<User, ServiceError> {
        self.get_json(&format!("/users/{cognito_id}")).await
    }

    async fn create_user(&self, input: &CreateUser) -> Result<User, ServiceError> {
        let envelope: UserEnvelope = self.post_json("/users", input).await?;
        Ok(envelope.user)
    }

    async fn list_teams(&self) -> Result<Vec<Team>, ServiceError> {
        self.get_json("/teams").await
    }

    async fn search(&self, query: &str) -> Result<SearchResults, ServiceError> {
        // Search text is user-typed, so let the builder encode it.
        let builder = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("query", query)]);
        let resp = self
            .with_auth(builder)?
            .send()
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        handle_response(resp).await
    }
}

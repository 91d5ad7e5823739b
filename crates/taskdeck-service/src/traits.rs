use async_trait::async_trait;
use taskdeck_core::project::{CreateProject, Project};
use taskdeck_core::search::SearchResults;
use taskdeck_core::task::{CreateTask, DeletedTask, Status, Task, UpdateTask};
use taskdeck_core::team::Team;
use taskdeck_core::user::{CreateUser, User};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("session invalid or expired: {0}")]
    Auth(String),
}

/// Abstraction over the task tracking operations.
///
/// The server routes and the client query layer program against this
/// trait. `LocalService` wraps a direct SQLite connection; `HttpService`
/// speaks to a remote server, so the same callers run over either
/// transport.
#[async_trait]
pub trait TaskService: Send + Sync {
    // -- Tasks --
    async fn list_tasks_by_project(&self, project_id: i64) -> Result<Vec<Task>, ServiceError>;
    /// Tasks the user authored or is assigned to, without duplicates.
    async fn list_tasks_by_user(&self, user_id: i64) -> Result<Vec<Task>, ServiceError>;
    async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError>;
    async fn update_task_status(&self, id: i64, status: Status) -> Result<Task, ServiceError>;
    async fn edit_task(&self, id: i64, update: &UpdateTask) -> Result<Task, ServiceError>;
    async fn delete_task(&self, id: i64) -> Result<DeletedTask, ServiceError>;

    // -- Projects --
    async fn list_projects(&self) -> Result<Vec<Project>, ServiceError>;
    async fn create_project(&self, input: &CreateProject) -> Result<Project, ServiceError>;

    // -- Users --
    async fn list_users(&self) -> Result<Vec<User>, ServiceError>;
    async fn get_user(&self, cognito_id: &str) -> Result<User, ServiceError>;
    async fn create_user(&self, input: &CreateUser) -> Result<User, ServiceError>;

    // -- Teams --
    async fn list_teams(&self) -> Result<Vec<Team>, ServiceError>;

    // -- Search --
    async fn search(&self, query: &str) -> Result<SearchResults, ServiceError>;
}

use async_trait::async_trait;
use taskdeck_core::project::{CreateProject, Project};
use taskdeck_core::search::SearchResults;
use taskdeck_core::task::{CreateTask, DeletedTask, Status, Task, UpdateTask};
use taskdeck_core::team::Team;
use taskdeck_core::user::{CreateUser, User};
use taskdeck_db::{Db, DbError};

use crate::{ServiceError, TaskService};

/// Local implementation backed by direct SQLite access. rusqlite is
/// blocking, so every call hops onto the blocking pool.
pub struct LocalService {
    db: Db,
}

impl LocalService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

impl From<DbError> for ServiceError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(msg) => ServiceError::NotFound(msg),
            DbError::Conflict(msg) => ServiceError::Conflict(msg),
            other => ServiceError::Storage(other.to_string()),
        }
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ServiceError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ServiceError::Validation(format!("{field} is required"))),
    }
}

#[async_trait]
impl TaskService for LocalService {
    async fn list_tasks_by_project(&self, project_id: i64) -> Result<Vec<Task>, ServiceError> {
        let db = self.db.clone();
        Ok(
            tokio::task::spawn_blocking(move || db.list_tasks_by_project(project_id))
                .await
                .map_err(|e| ServiceError::Storage(e.to_string()))??,
        )
    }

    async fn list_tasks_by_user(&self, user_id: i64) -> Result<Vec<Task>, ServiceError> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<Task>, ServiceError> {
            // The author arm matches on the identity-provider subject, so
            // resolve the user row first. An unknown user owns nothing.
            let user = match db.get_user(user_id) {
                Ok(user) => user,
                Err(DbError::NotFound(_)) => return Ok(Vec::new()),
                Err(e) => return Err(e.into()),
            };
            Ok(db.list_tasks_by_user(user_id, &user.cognito_id)?)
        })
        .await
        .map_err(|e| ServiceError::Storage(e.to_string()))?
    }

    async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError> {
        required(input.title.as_deref(), "title")?;
        let author_subject = required(input.author_user_id.as_deref(), "authorUserId")?.to_string();
        if input.project_id.is_none() {
            return Err(ServiceError::Validation("projectId is required".into()));
        }

        let db = self.db.clone();
        let input = input.clone();
        tokio::task::spawn_blocking(move || -> Result<Task, ServiceError> {
            let author = match db.get_user_by_cognito_id(&author_subject) {
                Ok(user) => user,
                Err(DbError::NotFound(_)) => {
                    return Err(ServiceError::Validation(format!(
                        "authorUserId '{author_subject}' does not resolve to a known user"
                    )))
                }
                Err(e) => return Err(e.into()),
            };
            Ok(db.create_task(&input, author.user_id)?)
        })
        .await
        .map_err(|e| ServiceError::Storage(e.to_string()))?
    }

    async fn update_task_status(&self, id: i64, status: Status) -> Result<Task, ServiceError> {
        let db = self.db.clone();
        Ok(
            tokio::task::spawn_blocking(move || db.update_task_status(id, status))
                .await
                .map_err(|e| ServiceError::Storage(e.to_string()))??,
        )
    }

    async fn edit_task(&self, id: i64, update: &UpdateTask) -> Result<Task, ServiceError> {
        let db = self.db.clone();
        let update = update.clone();
        Ok(tokio::task::spawn_blocking(move || db.update_task(id, &update))
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))??)
    }

    async fn delete_task(&self, id: i64) -> Result<DeletedTask, ServiceError> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || db.delete_task(id))
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))??;
        Ok(DeletedTask {
            success: true,
            message: "Task deleted successfully".into(),
            id,
        })
    }

    async fn list_projects(&self) -> Result<Vec<Project>, ServiceError> {
        let db = self.db.clone();
        Ok(tokio::task::spawn_blocking(move || db.list_projects())
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))??)
    }

    async fn create_project(&self, input: &CreateProject) -> Result<Project, ServiceError> {
        required(input.name.as_deref(), "name")?;
        let db = self.db.clone();
        let input = input.clone();
        Ok(tokio::task::spawn_blocking(move || db.create_project(&input))
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))??)
    }

    async fn list_users(&self) -> Result<Vec<User>, ServiceError> {
        let db = self.db.clone();
        Ok(tokio::task::spawn_blocking(move || db.list_users())
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))??)
    }

    async fn get_user(&self, cognito_id: &str) -> Result<User, ServiceError> {
        let db = self.db.clone();
        let cognito_id = cognito_id.to_string();
        Ok(
            tokio::task::spawn_blocking(move || db.get_user_by_cognito_id(&cognito_id))
                .await
                .map_err(|e| ServiceError::Storage(e.to_string()))??,
        )
    }

    async fn create_user(&self, input: &CreateUser) -> Result<User, ServiceError> {
        required(input.username.as_deref(), "username")?;
        required(input.cognito_id.as_deref(), "cognitoId")?;
        let db = self.db.clone();
        let input = input.clone();
        Ok(tokio::task::spawn_blocking(move || db.create_user(&input))
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))??)
    }

    async fn list_teams(&self) -> Result<Vec<Team>, ServiceError> {
        let db = self.db.clone();
        Ok(tokio::task::spawn_blocking(move || db.list_teams())
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))??)
    }

    async fn search(&self, query: &str) -> Result<SearchResults, ServiceError> {
        let db = self.db.clone();
        let query = query.to_string();
        Ok(tokio::task::spawn_blocking(move || db.search(&query))
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))??)
    }
}

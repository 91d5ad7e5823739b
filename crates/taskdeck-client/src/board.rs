use taskdeck_core::board::Board;
use taskdeck_core::task::{Status, Task};
use taskdeck_service::{ServiceError, TaskService};

use crate::cache::{QueryClient, QueryState};

/// Kanban view over one project, fed from the query cache. The board
/// always shows the four workflow columns; dropping a task on a column
/// reduces to a status mutation.
pub struct BoardController<'a, S> {
    client: &'a QueryClient<S>,
    project_id: i64,
}

impl<'a, S: TaskService> BoardController<'a, S> {
    pub fn new(client: &'a QueryClient<S>, project_id: i64) -> Self {
        BoardController { client, project_id }
    }

    pub fn project_id(&self) -> i64 {
        self.project_id
    }

    /// The grouped board in the task list's current cache phase.
    pub async fn view(&self) -> QueryState<Board> {
        match self.client.tasks_by_project(self.project_id).await {
            QueryState::Pending => QueryState::Pending,
            QueryState::Failed(err) => QueryState::Failed(err),
            QueryState::Ready(tasks) => QueryState::Ready(Board::group(tasks)),
        }
    }

    /// Persists a column drop. On success the task's cache tag is left
    /// stale, so the next [`view`](Self::view) picks up the move.
    pub async fn move_task(&self, task_id: i64, target: Status) -> Result<Task, ServiceError> {
        self.client.move_task(task_id, target).await
    }
}

use serde::Serialize;

use crate::task::{Status, Task};

/// A Kanban board over one project's tasks. Always carries exactly the
/// four workflow columns in canonical order, empty or not.
#[derive(Debug, Clone, Serialize)]
pub struct Board {
    pub columns: Vec<BoardColumn>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardColumn {
    pub status: Status,
    pub tasks: Vec<Task>,
}

impl Board {
    /// Partitions tasks into columns by exact status match. Input order
    /// is preserved within a column.
    pub fn group(tasks: Vec<Task>) -> Self {
        let mut columns: Vec<BoardColumn> = Status::BOARD_COLUMNS
            .iter()
            .map(|status| BoardColumn {
                status: *status,
                tasks: Vec::new(),
            })
            .collect();

        for task in tasks {
            if let Some(column) = columns.iter_mut().find(|c| c.status == task.status) {
                column.tasks.push(task);
            }
        }

        Board { columns }
    }

    pub fn column(&self, status: Status) -> &BoardColumn {
        // BOARD_COLUMNS covers every status variant, so the find is total.
        self.columns
            .iter()
            .find(|c| c.status == status)
            .unwrap_or(&self.columns[0])
    }

    pub fn count(&self, status: Status) -> usize {
        self.column(status).tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;

    fn task(id: i64, status: Status) -> Task {
        Task {
            id,
            title: format!("task {id}"),
            description: None,
            status,
            priority: Priority::Backlog,
            tags: None,
            start_date: None,
            due_date: None,
            points: None,
            project_id: 1,
            author_user_id: 1,
            assigned_user_id: None,
            author: None,
            assignee: None,
            comments: Vec::new(),
            attachments: Vec::new(),
        }
    }

    #[test]
    fn four_columns_in_canonical_order() {
        let board = Board::group(Vec::new());
        let order: Vec<Status> = board.columns.iter().map(|c| c.status).collect();
        assert_eq!(
            order,
            vec![
                Status::ToDo,
                Status::WorkInProgress,
                Status::UnderReview,
                Status::Completed,
            ]
        );
    }

    #[test]
    fn grouping_counts() {
        let board = Board::group(vec![
            task(1, Status::ToDo),
            task(2, Status::Completed),
            task(3, Status::UnderReview),
            task(4, Status::ToDo),
        ]);
        assert_eq!(board.count(Status::ToDo), 2);
        assert_eq!(board.count(Status::WorkInProgress), 0);
        assert_eq!(board.count(Status::UnderReview), 1);
        assert_eq!(board.count(Status::Completed), 1);
    }

    #[test]
    fn column_preserves_input_order() {
        let board = Board::group(vec![
            task(9, Status::ToDo),
            task(3, Status::ToDo),
            task(5, Status::ToDo),
        ]);
        let ids: Vec<i64> = board.column(Status::ToDo).tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![9, 3, 5]);
    }

    #[test]
    fn every_task_lands_in_exactly_one_column() {
        let board = Board::group(vec![
            task(1, Status::ToDo),
            task(2, Status::WorkInProgress),
            task(3, Status::UnderReview),
            task(4, Status::Completed),
        ]);
        let total: usize = board.columns.iter().map(|c| c.tasks.len()).sum();
        assert_eq!(total, 4);
    }
}

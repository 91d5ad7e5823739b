use rusqlite::{params, Connection, Row};

use taskdeck_core::task::{CreateTask, Priority, Status, Task, UpdateTask};
use taskdeck_core::user::User;

use super::users::row_to_user;
use super::{attachments, comments};
use crate::{Db, DbError};

pub(crate) fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    let status_str: String = row.get("status")?;
    let priority_str: String = row.get("priority")?;
    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: Status::parse_str(&status_str).unwrap_or_default(),
        priority: Priority::parse_str(&priority_str).unwrap_or_default(),
        tags: row.get("tags")?,
        start_date: row.get("start_date")?,
        due_date: row.get("due_date")?,
        points: row.get("points")?,
        project_id: row.get("project_id")?,
        author_user_id: row.get("author_user_id")?,
        assigned_user_id: row.get("assigned_user_id")?,
        author: None,
        assignee: None,
        comments: Vec::new(),
        attachments: Vec::new(),
    })
}

fn find_user(conn: &Connection, user_id: i64) -> Result<Option<User>, DbError> {
    match conn.query_row(
        "SELECT * FROM users WHERE user_id = ?1",
        params![user_id],
        row_to_user,
    ) {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(DbError::Sqlite(e)),
    }
}

/// Attaches the author and assignee rows, and optionally the comment and
/// attachment lists, to a bare task row.
fn hydrate_task(conn: &Connection, task: &mut Task, with_children: bool) -> Result<(), DbError> {
    task.author = find_user(conn, task.author_user_id)?;
    if let Some(assignee_id) = task.assigned_user_id {
        task.assignee = find_user(conn, assignee_id)?;
    }
    if with_children {
        task.comments = comments::list_for_task(conn, task.id)?;
        task.attachments = attachments::list_for_task(conn, task.id)?;
    }
    Ok(())
}

fn get_task_row(conn: &Connection, id: i64) -> Result<Task, DbError> {
    conn.query_row("SELECT * FROM tasks WHERE id = ?1", params![id], row_to_task)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("task {id}")),
            other => DbError::Sqlite(other),
        })
}

impl Db {
    /// `author_user_id` is the already-resolved relational id; the service
    /// resolves the identity-provider subject before calling in.
    pub fn create_task(&self, input: &CreateTask, author_user_id: i64) -> Result<Task, DbError> {
        self.with_conn(|conn| {
            let status = input.status.unwrap_or_default();
            let priority = input.priority.unwrap_or_default();
            conn.execute(
                "INSERT INTO tasks (
                    title, description, status, priority, tags,
                    start_date, due_date, points,
                    project_id, author_user_id, assigned_user_id
                 )
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    input.title,
                    input.description,
                    status.as_str(),
                    priority.as_str(),
                    input.tags,
                    input.start_date,
                    input.due_date,
                    input.points,
                    input.project_id,
                    author_user_id,
                    input.assigned_user_id,
                ],
            )?;
            let id = conn.last_insert_rowid();
            get_task_row(conn, id)
        })
    }

    pub fn get_task(&self, id: i64) -> Result<Task, DbError> {
        self.with_conn(|conn| {
            let mut task = get_task_row(conn, id)?;
            hydrate_task(conn, &mut task, true)?;
            Ok(task)
        })
    }

    pub fn list_tasks_by_project(&self, project_id: i64) -> Result<Vec<Task>, DbError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT * FROM tasks WHERE project_id = ?1 ORDER BY id")?;
            let mut tasks = stmt
                .query_map(params![project_id], row_to_task)?
                .collect::<Result<Vec<_>, _>>()?;
            for task in &mut tasks {
                hydrate_task(conn, task, true)?;
            }
            Ok(tasks)
        })
    }

    /// Union of both ownership arms: assignee matched by relational id,
    /// author matched through the identity-provider subject.
    pub fn list_tasks_by_user(
        &self,
        user_id: i64,
        author_identity: &str,
    ) -> Result<Vec<Task>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM tasks
                 WHERE assigned_user_id = ?1
                    OR author_user_id IN (SELECT user_id FROM users WHERE cognito_id = ?2)
                 ORDER BY id",
            )?;
            let mut tasks = stmt
                .query_map(params![user_id, author_identity], row_to_task)?
                .collect::<Result<Vec<_>, _>>()?;
            for task in &mut tasks {
                hydrate_task(conn, task, false)?;
            }
            Ok(tasks)
        })
    }

    pub fn update_task_status(&self, id: i64, status: Status) -> Result<Task, DbError> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE tasks SET status = ?2 WHERE id = ?1",
                params![id, status.as_str()],
            )?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("task {id}")));
            }
            get_task_row(conn, id)
        })
    }

    pub fn update_task(&self, id: i64, update: &UpdateTask) -> Result<Task, DbError> {
        self.with_conn(|conn| {
            let mut sets: Vec<String> = Vec::new();
            let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

            if let Some(ref title) = update.title {
                param_values.push(Box::new(title.clone()));
                sets.push(format!("title = ?{}", param_values.len()));
            }
            if let Some(ref description) = update.description {
                param_values.push(Box::new(description.clone()));
                sets.push(format!("description = ?{}", param_values.len()));
            }
            if let Some(status) = update.status {
                param_values.push(Box::new(status.as_str().to_string()));
                sets.push(format!("status = ?{}", param_values.len()));
            }
            if let Some(priority) = update.priority {
                param_values.push(Box::new(priority.as_str().to_string()));
                sets.push(format!("priority = ?{}", param_values.len()));
            }
            if let Some(ref tags) = update.tags {
                param_values.push(Box::new(tags.clone()));
                sets.push(format!("tags = ?{}", param_values.len()));
            }
            if let Some(ref start_date) = update.start_date {
                match start_date {
                    Some(d) => {
                        param_values.push(Box::new(*d));
                        sets.push(format!("start_date = ?{}", param_values.len()));
                    }
                    None => sets.push("start_date = NULL".to_string()),
                }
            }
            if let Some(ref due_date) = update.due_date {
                match due_date {
                    Some(d) => {
                        param_values.push(Box::new(*d));
                        sets.push(format!("due_date = ?{}", param_values.len()));
                    }
                    None => sets.push("due_date = NULL".to_string()),
                }
            }
            if let Some(ref points) = update.points {
                param_values.push(Box::new(points.clone()));
                sets.push(format!("points = ?{}", param_values.len()));
            }
            if let Some(ref assigned) = update.assigned_user_id {
                match assigned {
                    Some(user_id) => {
                        param_values.push(Box::new(*user_id));
                        sets.push(format!("assigned_user_id = ?{}", param_values.len()));
                    }
                    None => sets.push("assigned_user_id = NULL".to_string()),
                }
            }

            if sets.is_empty() {
                return get_task_row(conn, id);
            }

            param_values.push(Box::new(id));
            let sql = format!(
                "UPDATE tasks SET {} WHERE id = ?{}",
                sets.join(", "),
                param_values.len()
            );
            let params_ref: Vec<&dyn rusqlite::types::ToSql> =
                param_values.iter().map(|p| p.as_ref()).collect();

            let changed = conn.execute(&sql, params_ref.as_slice())?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("task {id}")));
            }
            get_task_row(conn, id)
        })
    }

    /// Removes the task and everything hanging off it in one transaction:
    /// comments, attachments, assignment links, then the task row itself.
    pub fn delete_task(&self, id: i64) -> Result<(), DbError> {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute("DELETE FROM comments WHERE task_id = ?1", params![id])?;
            tx.execute("DELETE FROM attachments WHERE task_id = ?1", params![id])?;
            tx.execute(
                "DELETE FROM task_assignments WHERE task_id = ?1",
                params![id],
            )?;
            let changed = tx.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
            if changed == 0 {
                // drop of the open transaction rolls the child deletes back
                return Err(DbError::NotFound(format!("task {id}")));
            }
            tx.commit()?;
            Ok(())
        })
    }

    pub fn assign_task(&self, user_id: i64, task_id: i64) -> Result<(), DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO task_assignments (user_id, task_id) VALUES (?1, ?2)",
                params![user_id, task_id],
            )?;
            Ok(())
        })
    }

    pub fn list_assignment_user_ids(&self, task_id: i64) -> Result<Vec<i64>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id FROM task_assignments WHERE task_id = ?1 ORDER BY id",
            )?;
            let ids = stmt
                .query_map(params![task_id], |row| row.get(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ids)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{Db, DbError};
    use taskdeck_core::project::CreateProject;
    use taskdeck_core::task::{CreateTask, Priority, Status, UpdateTask};
    use taskdeck_core::user::{CreateUser, User};

    fn setup() -> (Db, i64, User, User) {
        let db = Db::open_in_memory().unwrap();
        let project = db
            .create_project(&CreateProject {
                name: Some("Test Project".into()),
                ..Default::default()
            })
            .unwrap();
        let author = db
            .create_user(&CreateUser {
                username: Some("alice".into()),
                cognito_id: Some("sub-alice".into()),
                ..Default::default()
            })
            .unwrap();
        let assignee = db
            .create_user(&CreateUser {
                username: Some("bob".into()),
                cognito_id: Some("sub-bob".into()),
                ..Default::default()
            })
            .unwrap();
        (db, project.id, author, assignee)
    }

    fn make_task(title: &str, project_id: i64) -> CreateTask {
        CreateTask {
            title: Some(title.into()),
            project_id: Some(project_id),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_task_defaults() {
        let (db, project_id, author, _) = setup();
        let task = db
            .create_task(&make_task("Write spec", project_id), author.user_id)
            .unwrap();

        assert_eq!(task.title, "Write spec");
        assert_eq!(task.status, Status::ToDo);
        assert_eq!(task.priority, Priority::Backlog);
        assert_eq!(task.author_user_id, author.user_id);
        assert!(task.description.is_none());
        assert!(task.points.is_none());
        assert!(task.assigned_user_id.is_none());
    }

    #[test]
    fn test_list_tasks_by_project_hydrates() {
        let (db, project_id, author, assignee) = setup();
        let task = db
            .create_task(
                &CreateTask {
                    assigned_user_id: Some(assignee.user_id),
                    ..make_task("Hydrated", project_id)
                },
                author.user_id,
            )
            .unwrap();
        db.create_comment("first!", task.id, assignee.user_id).unwrap();

        let tasks = db.list_tasks_by_project(project_id).unwrap();
        assert_eq!(tasks.len(), 1);
        let loaded = &tasks[0];
        assert_eq!(loaded.author.as_ref().unwrap().username, "alice");
        assert_eq!(loaded.assignee.as_ref().unwrap().username, "bob");
        assert_eq!(loaded.comments.len(), 1);
        assert_eq!(loaded.comments[0].text, "first!");
    }

    #[test]
    fn test_update_task_status() {
        let (db, project_id, author, _) = setup();
        let task = db
            .create_task(&make_task("Move me", project_id), author.user_id)
            .unwrap();

        let updated = db.update_task_status(task.id, Status::UnderReview).unwrap();
        assert_eq!(updated.status, Status::UnderReview);

        let read_back = db.get_task(task.id).unwrap();
        assert_eq!(read_back.status, Status::UnderReview);

        let err = db.update_task_status(9999, Status::Completed).unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[test]
    fn test_update_task_patch() {
        let (db, project_id, author, assignee) = setup();
        let task = db
            .create_task(
                &CreateTask {
                    description: Some("old".into()),
                    due_date: Some(chrono::Utc::now()),
                    assigned_user_id: Some(assignee.user_id),
                    ..make_task("Patch me", project_id)
                },
                author.user_id,
            )
            .unwrap();

        let updated = db
            .update_task(
                task.id,
                &UpdateTask {
                    title: Some("Patched".into()),
                    due_date: Some(None),
                    assigned_user_id: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title, "Patched");
        // untouched fields survive
        assert_eq!(updated.description.as_deref(), Some("old"));
        // explicit nulls clear
        assert!(updated.due_date.is_none());
        assert!(updated.assigned_user_id.is_none());
    }

    #[test]
    fn test_update_task_empty_patch_is_noop() {
        let (db, project_id, author, _) = setup();
        let task = db
            .create_task(&make_task("Unchanged", project_id), author.user_id)
            .unwrap();

        let same = db.update_task(task.id, &UpdateTask::default()).unwrap();
        assert_eq!(same.title, "Unchanged");

        let err = db.update_task(555, &UpdateTask::default()).unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[test]
    fn test_delete_task_cascades() {
        let (db, project_id, author, assignee) = setup();
        let task = db
            .create_task(&make_task("Doomed", project_id), author.user_id)
            .unwrap();
        let comment = db.create_comment("gone soon", task.id, author.user_id).unwrap();
        let attachment = db
            .create_attachment("https://files.example/a.png", "a.png", task.id, author.user_id)
            .unwrap();
        db.assign_task(assignee.user_id, task.id).unwrap();

        db.delete_task(task.id).unwrap();

        assert!(matches!(db.get_task(task.id), Err(DbError::NotFound(_))));
        assert!(matches!(db.get_comment(comment.id), Err(DbError::NotFound(_))));
        assert!(matches!(
            db.get_attachment(attachment.id),
            Err(DbError::NotFound(_))
        ));
        assert!(db.list_assignment_user_ids(task.id).unwrap().is_empty());
    }

    #[test]
    fn test_delete_task_not_found_rolls_back() {
        let (db, project_id, author, _) = setup();
        let task = db
            .create_task(&make_task("Survivor", project_id), author.user_id)
            .unwrap();
        db.create_comment("still here", task.id, author.user_id).unwrap();

        let err = db.delete_task(4242).unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));

        // unrelated rows untouched
        let survivor = db.get_task(task.id).unwrap();
        assert_eq!(survivor.comments.len(), 1);
    }

    #[test]
    fn test_list_tasks_by_user_union() {
        let (db, project_id, author, assignee) = setup();
        // authored by alice only
        db.create_task(&make_task("Authored", project_id), author.user_id)
            .unwrap();
        // assigned to alice, authored by bob
        db.create_task(
            &CreateTask {
                assigned_user_id: Some(author.user_id),
                ..make_task("Assigned", project_id)
            },
            assignee.user_id,
        )
        .unwrap();
        // both authored by and assigned to alice — must not duplicate
        db.create_task(
            &CreateTask {
                assigned_user_id: Some(author.user_id),
                ..make_task("Both", project_id)
            },
            author.user_id,
        )
        .unwrap();
        // unrelated
        db.create_task(&make_task("Other", project_id), assignee.user_id)
            .unwrap();

        let tasks = db
            .list_tasks_by_user(author.user_id, &author.cognito_id)
            .unwrap();
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Authored", "Assigned", "Both"]);
        // author/assignee come hydrated on this path
        assert!(tasks[0].author.is_some());
    }

    #[test]
    fn test_list_tasks_by_user_unknown_identity_matches_assignee_only() {
        let (db, project_id, author, assignee) = setup();
        db.create_task(&make_task("Authored", project_id), author.user_id)
            .unwrap();
        db.create_task(
            &CreateTask {
                assigned_user_id: Some(author.user_id),
                ..make_task("Assigned", project_id)
            },
            assignee.user_id,
        )
        .unwrap();

        let tasks = db.list_tasks_by_user(author.user_id, "no-such-subject").unwrap();
        let titles: Vec<&str> = tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Assigned"]);
    }
}

use rusqlite::Connection;
use tracing::info;

use crate::DbError;

pub fn run(conn: &Connection) -> Result<(), DbError> {
    // Original schema — idempotent CREATE TABLE IF NOT EXISTS
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS projects (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            description TEXT,
            start_date  TEXT,
            end_date    TEXT
        );

        CREATE TABLE IF NOT EXISTS teams (
            id                      INTEGER PRIMARY KEY AUTOINCREMENT,
            team_name               TEXT NOT NULL,
            product_owner_user_id   INTEGER,
            project_manager_user_id INTEGER
        );

        CREATE TABLE IF NOT EXISTS users (
            user_id             INTEGER PRIMARY KEY AUTOINCREMENT,
            username            TEXT NOT NULL,
            email               TEXT,
            profile_picture_url TEXT,
            cognito_id          TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            title            TEXT NOT NULL,
            description      TEXT,
            status           TEXT NOT NULL DEFAULT 'To Do'
                                 CHECK(status IN (
                                     'To Do', 'Work In Progress',
                                     'Under Review', 'Completed'
                                 )),
            priority         TEXT NOT NULL DEFAULT 'Backlog'
                                 CHECK(priority IN ('Urgent', 'High', 'Medium', 'Low', 'Backlog')),
            tags             TEXT,
            start_date       TEXT,
            due_date         TEXT,
            points           TEXT,
            project_id       INTEGER NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            author_user_id   INTEGER NOT NULL REFERENCES users(user_id),
            assigned_user_id INTEGER REFERENCES users(user_id)
        );
        CREATE INDEX IF NOT EXISTS idx_tasks_project  ON tasks(project_id);
        CREATE INDEX IF NOT EXISTS idx_tasks_author   ON tasks(author_user_id);
        CREATE INDEX IF NOT EXISTS idx_tasks_assignee ON tasks(assigned_user_id);

        CREATE TABLE IF NOT EXISTS comments (
            id      INTEGER PRIMARY KEY AUTOINCREMENT,
            text    TEXT NOT NULL,
            task_id INTEGER NOT NULL REFERENCES tasks(id),
            user_id INTEGER NOT NULL REFERENCES users(user_id)
        );
        CREATE INDEX IF NOT EXISTS idx_comments_task ON comments(task_id);

        CREATE TABLE IF NOT EXISTS attachments (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            file_url       TEXT NOT NULL,
            file_name      TEXT NOT NULL,
            task_id        INTEGER NOT NULL REFERENCES tasks(id),
            uploaded_by_id INTEGER NOT NULL REFERENCES users(user_id)
        );
        CREATE INDEX IF NOT EXISTS idx_attachments_task ON attachments(task_id);
        ",
    )?;

    // Versioned migrations
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );",
    )?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    if current_version < 1 {
        info!("applying schema migration v1 (task_assignments)");
        // v1: assignment links, kept alongside the denormalized
        // assigned_user_id so task deletion can clear both
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS task_assignments (
                id      INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(user_id),
                task_id INTEGER NOT NULL REFERENCES tasks(id)
            );
            CREATE INDEX IF NOT EXISTS idx_assignments_task ON task_assignments(task_id);
            CREATE INDEX IF NOT EXISTS idx_assignments_user ON task_assignments(user_id);",
        )?;
        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (1, datetime('now'))",
            [],
        )?;
    }

    if current_version < 2 {
        info!("applying schema migration v2 (users.team_id)");
        // v2: team membership on users
        let has_column = |table: &str, col: &str| -> bool {
            conn.prepare(&format!("SELECT {col} FROM {table} LIMIT 0"))
                .is_ok()
        };
        if !has_column("users", "team_id") {
            conn.execute_batch(
                "ALTER TABLE users ADD COLUMN team_id INTEGER REFERENCES teams(id);",
            )?;
        }
        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (2, datetime('now'))",
            [],
        )?;
    }

    Ok(())
}

use rusqlite::params;

use taskdeck_core::search::SearchResults;

use super::{projects::row_to_project, users::row_to_user};
use crate::{Db, DbError};

impl Db {
    /// Case-insensitive substring match across tasks, projects and users.
    /// An empty query matches nothing.
    pub fn search(&self, query: &str) -> Result<SearchResults, DbError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(SearchResults::default());
        }
        let like = format!("%{query}%");

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM tasks
                 WHERE title LIKE ?1 COLLATE NOCASE
                    OR description LIKE ?1 COLLATE NOCASE
                 ORDER BY id",
            )?;
            let tasks = stmt
                .query_map(params![like], super::tasks::row_to_task)?
                .collect::<Result<Vec<_>, _>>()?;

            let mut stmt = conn.prepare(
                "SELECT * FROM projects
                 WHERE name LIKE ?1 COLLATE NOCASE
                    OR description LIKE ?1 COLLATE NOCASE
                 ORDER BY id",
            )?;
            let projects = stmt
                .query_map(params![like], row_to_project)?
                .collect::<Result<Vec<_>, _>>()?;

            let mut stmt = conn.prepare(
                "SELECT * FROM users
                 WHERE username LIKE ?1 COLLATE NOCASE
                 ORDER BY user_id",
            )?;
            let users = stmt
                .query_map(params![like], row_to_user)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(SearchResults {
                tasks,
                projects,
                users,
            })
        })
    }
}

use rusqlite::{params, Connection, Row};

use taskdeck_core::comment::Comment;

use crate::{Db, DbError};

fn row_to_comment(row: &Row) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get("id")?,
        text: row.get("text")?,
        task_id: row.get("task_id")?,
        user_id: row.get("user_id")?,
    })
}

pub(crate) fn list_for_task(conn: &Connection, task_id: i64) -> Result<Vec<Comment>, DbError> {
    let mut stmt = conn.prepare("SELECT * FROM comments WHERE task_id = ?1 ORDER BY id")?;
    let comments = stmt
        .query_map(params![task_id], row_to_comment)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(comments)
}

impl Db {
    pub fn create_comment(
        &self,
        text: &str,
        task_id: i64,
        user_id: i64,
    ) -> Result<Comment, DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO comments (text, task_id, user_id) VALUES (?1, ?2, ?3)",
                params![text, task_id, user_id],
            )?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                "SELECT * FROM comments WHERE id = ?1",
                params![id],
                row_to_comment,
            )
            .map_err(DbError::from)
        })
    }

    pub fn get_comment(&self, id: i64) -> Result<Comment, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM comments WHERE id = ?1",
                params![id],
                row_to_comment,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    DbError::NotFound(format!("comment {id}"))
                }
                other => DbError::Sqlite(other),
            })
        })
    }

    pub fn list_comments(&self, task_id: i64) -> Result<Vec<Comment>, DbError> {
        self.with_conn(|conn| list_for_task(conn, task_id))
    }
}

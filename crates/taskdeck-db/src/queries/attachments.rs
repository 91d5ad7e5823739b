use rusqlite::{params, Connection, Row};

use taskdeck_core::attachment::Attachment;

use crate::{Db, DbError};

fn row_to_attachment(row: &Row) -> rusqlite::Result<Attachment> {
    Ok(Attachment {
        id: row.get("id")?,
        file_url: row.get("file_url")?,
        file_name: row.get("file_name")?,
        task_id: row.get("task_id")?,
        uploaded_by_id: row.get("uploaded_by_id")?,
    })
}

pub(crate) fn list_for_task(conn: &Connection, task_id: i64) -> Result<Vec<Attachment>, DbError> {
    let mut stmt = conn.prepare("SELECT * FROM attachments WHERE task_id = ?1 ORDER BY id")?;
    let attachments = stmt
        .query_map(params![task_id], row_to_attachment)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(attachments)
}

impl Db {
    pub fn create_attachment(
        &self,
        file_url: &str,
        file_name: &str,
        task_id: i64,
        uploaded_by_id: i64,
    ) -> Result<Attachment, DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO attachments (file_url, file_name, task_id, uploaded_by_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![file_url, file_name, task_id, uploaded_by_id],
            )?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                "SELECT * FROM attachments WHERE id = ?1",
                params![id],
                row_to_attachment,
            )
            .map_err(DbError::from)
        })
    }

    pub fn get_attachment(&self, id: i64) -> Result<Attachment, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM attachments WHERE id = ?1",
                params![id],
                row_to_attachment,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    DbError::NotFound(format!("attachment {id}"))
                }
                other => DbError::Sqlite(other),
            })
        })
    }

    pub fn list_attachments(&self, task_id: i64) -> Result<Vec<Attachment>, DbError> {
        self.with_conn(|conn| list_for_task(conn, task_id))
    }
}

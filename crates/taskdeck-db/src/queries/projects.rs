use rusqlite::{params, Row};

use taskdeck_core::project::{CreateProject, Project};

use crate::{Db, DbError};

pub(crate) fn row_to_project(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
    })
}

impl Db {
    pub fn create_project(&self, input: &CreateProject) -> Result<Project, DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO projects (name, description, start_date, end_date)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    input.name,
                    input.description,
                    input.start_date,
                    input.end_date
                ],
            )?;
            let id = conn.last_insert_rowid();
            let project = conn.query_row(
                "SELECT * FROM projects WHERE id = ?1",
                params![id],
                row_to_project,
            )?;
            Ok(project)
        })
    }

    pub fn get_project(&self, id: i64) -> Result<Project, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM projects WHERE id = ?1",
                params![id],
                row_to_project,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("project {id}")),
                other => DbError::Sqlite(other),
            })
        })
    }

    pub fn list_projects(&self) -> Result<Vec<Project>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM projects ORDER BY id")?;
            let projects = stmt
                .query_map([], row_to_project)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(projects)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::Db;
    use taskdeck_core::project::CreateProject;

    #[test]
    fn test_project_crud() {
        let db = Db::open_in_memory().unwrap();

        let project = db
            .create_project(&CreateProject {
                name: Some("Platform Rewrite".into()),
                description: Some("Q3 platform work".into()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(project.name, "Platform Rewrite");
        assert!(project.start_date.is_none());

        let fetched = db.get_project(project.id).unwrap();
        assert_eq!(fetched.id, project.id);
        assert_eq!(fetched.description.as_deref(), Some("Q3 platform work"));

        let all = db.list_projects().unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_get_project_not_found() {
        let db = Db::open_in_memory().unwrap();
        let err = db.get_project(999).unwrap_err();
        assert!(matches!(err, crate::DbError::NotFound(_)));
    }
}

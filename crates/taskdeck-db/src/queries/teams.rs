use rusqlite::{params, Row};

use taskdeck_core::team::Team;

use crate::{Db, DbError};

fn row_to_team(row: &Row) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get("id")?,
        team_name: row.get("team_name")?,
        product_owner_user_id: row.get("product_owner_user_id")?,
        project_manager_user_id: row.get("project_manager_user_id")?,
        product_owner_username: row.get("product_owner_username")?,
        project_manager_username: row.get("project_manager_username")?,
    })
}

// Every team select goes through the user join so one row shape serves
// both the list and the create read-back.
const TEAM_SELECT: &str = "SELECT t.*,
        po.username AS product_owner_username,
        pm.username AS project_manager_username
 FROM teams t
 LEFT JOIN users po ON po.user_id = t.product_owner_user_id
 LEFT JOIN users pm ON pm.user_id = t.project_manager_user_id";

impl Db {
    pub fn create_team(
        &self,
        team_name: &str,
        product_owner_user_id: Option<i64>,
        project_manager_user_id: Option<i64>,
    ) -> Result<Team, DbError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO teams (team_name, product_owner_user_id, project_manager_user_id)
                 VALUES (?1, ?2, ?3)",
                params![team_name, product_owner_user_id, project_manager_user_id],
            )?;
            let id = conn.last_insert_rowid();
            conn.query_row(
                &format!("{TEAM_SELECT} WHERE t.id = ?1"),
                params![id],
                row_to_team,
            )
            .map_err(DbError::from)
        })
    }

    /// Teams with owner and manager usernames joined in, the shape the
    /// teams grid renders directly.
    pub fn list_teams(&self) -> Result<Vec<Team>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!("{TEAM_SELECT} ORDER BY t.id"))?;
            let teams = stmt
                .query_map([], row_to_team)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(teams)
        })
    }
}

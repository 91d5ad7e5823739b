use rusqlite::{params, Row};

use taskdeck_core::user::{CreateUser, User, DEFAULT_PROFILE_PICTURE};

use crate::{Db, DbError};

pub(crate) fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        user_id: row.get("user_id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        profile_picture_url: row.get("profile_picture_url")?,
        cognito_id: row.get("cognito_id")?,
        team_id: row.get("team_id")?,
    })
}

impl Db {
    pub fn create_user(&self, input: &CreateUser) -> Result<User, DbError> {
        self.with_conn(|conn| {
            let cognito_id = input.cognito_id.as_deref().unwrap_or_default();
            let existing = conn
                .query_row(
                    "SELECT * FROM users WHERE cognito_id = ?1",
                    params![cognito_id],
                    row_to_user,
                )
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(DbError::Sqlite(other)),
                })?;
            if existing.is_some() {
                return Err(DbError::Conflict(
                    "User with this cognitoId already exists".into(),
                ));
            }

            let picture = input
                .profile_picture_url
                .clone()
                .unwrap_or_else(|| DEFAULT_PROFILE_PICTURE.to_string());
            conn.execute(
                "INSERT INTO users (username, email, profile_picture_url, cognito_id, team_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    input.username,
                    input.email,
                    picture,
                    cognito_id,
                    input.team_id
                ],
            )
            .map_err(|e| match e {
                // Unique index on cognito_id; a racing insert lands here.
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    DbError::Conflict("User with this cognitoId already exists".into())
                }
                other => DbError::Sqlite(other),
            })?;
            let id = conn.last_insert_rowid();
            let user = conn.query_row(
                "SELECT * FROM users WHERE user_id = ?1",
                params![id],
                row_to_user,
            )?;
            Ok(user)
        })
    }

    pub fn get_user_by_cognito_id(&self, cognito_id: &str) -> Result<User, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM users WHERE cognito_id = ?1",
                params![cognito_id],
                row_to_user,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    DbError::NotFound(format!("user with cognitoId '{cognito_id}'"))
                }
                other => DbError::Sqlite(other),
            })
        })
    }

    pub fn get_user(&self, user_id: i64) -> Result<User, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM users WHERE user_id = ?1",
                params![user_id],
                row_to_user,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    DbError::NotFound(format!("user {user_id}"))
                }
                other => DbError::Sqlite(other),
            })
        })
    }

    pub fn list_users(&self) -> Result<Vec<User>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM users ORDER BY user_id")?;
            let users = stmt
                .query_map([], row_to_user)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(users)
        })
    }
}

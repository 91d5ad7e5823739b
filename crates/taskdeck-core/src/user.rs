use serde::{Deserialize, Serialize};

/// The placeholder avatar applied when a new user supplies none.
pub const DEFAULT_PROFILE_PICTURE: &str = "i1.jpg";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub email: Option<String>,
    pub profile_picture_url: Option<String>,
    /// Identity-provider subject. Unique; token issuance itself lives
    /// outside this system.
    pub cognito_id: String,
    pub team_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateUser {
    pub username: Option<String>,
    pub cognito_id: Option<String>,
    pub email: Option<String>,
    pub profile_picture_url: Option<String>,
    pub team_id: Option<i64>,
}

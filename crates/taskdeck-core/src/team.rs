use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: i64,
    pub team_name: String,
    pub product_owner_user_id: Option<i64>,
    pub project_manager_user_id: Option<i64>,
    /// Resolved from the user table by the list endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_owner_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_manager_username: Option<String>,
}

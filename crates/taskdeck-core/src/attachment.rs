use serde::{Deserialize, Serialize};

/// File metadata only. The URL points at external storage and is never
/// dereferenced here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: i64,
    #[serde(rename = "fileURL")]
    pub file_url: String,
    pub file_name: String,
    pub task_id: i64,
    pub uploaded_by_id: i64,
}

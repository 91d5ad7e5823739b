use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::attachment::Attachment;
use crate::comment::Comment;
use crate::user::User;

/// Workflow status. The wire labels are load-bearing: board column
/// membership is decided by exact match on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "Work In Progress")]
    WorkInProgress,
    #[serde(rename = "Under Review")]
    UnderReview,
    #[serde(rename = "Completed")]
    Completed,
}

impl Status {
    /// Canonical board order, left to right.
    pub const BOARD_COLUMNS: &'static [Status] = &[
        Status::ToDo,
        Status::WorkInProgress,
        Status::UnderReview,
        Status::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::ToDo => "To Do",
            Status::WorkInProgress => "Work In Progress",
            Status::UnderReview => "Under Review",
            Status::Completed => "Completed",
        }
    }

    /// Exact-match parse of a wire label. No coercion of unknown values.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "To Do" => Some(Status::ToDo),
            "Work In Progress" => Some(Status::WorkInProgress),
            "Under Review" => Some(Status::UnderReview),
            "Completed" => Some(Status::Completed),
            _ => None,
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::ToDo
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Urgent,
    High,
    Medium,
    Low,
    Backlog,
}

impl Priority {
    pub const ALL: &'static [Priority] = &[
        Priority::Urgent,
        Priority::High,
        Priority::Medium,
        Priority::Low,
        Priority::Backlog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Urgent => "Urgent",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
            Priority::Backlog => "Backlog",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "Urgent" => Some(Priority::Urgent),
            "High" => Some(Priority::High),
            "Medium" => Some(Priority::Medium),
            "Low" => Some(Priority::Low),
            "Backlog" => Some(Priority::Backlog),
            _ => None,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Backlog
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: Status,
    pub priority: Priority,
    /// Free-form comma-separated labels, opaque to the server.
    pub tags: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    /// Story points, carried as a numeric string.
    pub points: Option<String>,
    pub project_id: i64,
    pub author_user_id: i64,
    pub assigned_user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<User>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// Creation input. Required fields are checked by the service so that a
/// missing title or project id surfaces as a validation error rather than
/// a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub tags: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub points: Option<String>,
    pub project_id: Option<i64>,
    /// Identity-provider subject of the author, resolved to a user id at
    /// write time.
    pub author_user_id: Option<String>,
    pub assigned_user_id: Option<i64>,
}

/// Full-field patch. Outer `None` leaves a field unchanged; for the
/// clearable fields, `Some(None)` (wire `null`) clears the value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_clearable_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<Option<DateTime<Utc>>>,
    #[serde(
        default,
        deserialize_with = "de_clearable_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<String>,
    #[serde(
        default,
        deserialize_with = "de_assigned_user",
        skip_serializing_if = "Option::is_none"
    )]
    pub assigned_user_id: Option<Option<i64>>,
}

/// Acknowledgement returned by task deletion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedTask {
    pub success: bool,
    pub message: String,
    pub id: i64,
}

/// A date field that was present in the patch. `null` arrives as
/// `Some(None)` and clears the stored value; plain `Option` flattening
/// would fold it into "absent".
fn de_clearable_date<'de, D>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<DateTime<Utc>>::deserialize(deserializer).map(Some)
}

/// Accepts the assignee reference in the shapes clients actually send:
/// a JSON number, a numeric string, `null`, or an empty string. Empty,
/// null and zero all clear the assignment; a non-numeric string is
/// rejected.
fn de_assigned_user<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Text(String),
    }

    let raw = Option::<Raw>::deserialize(deserializer)?;
    let resolved = match raw {
        None => None,
        Some(Raw::Num(0)) => None,
        Some(Raw::Num(n)) => Some(n),
        Some(Raw::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                Some(s.parse::<i64>().map_err(|_| {
                    serde::de::Error::custom("assignedUserId must be a numeric user id")
                })?)
            }
        }
    };
    Ok(Some(resolved))
}

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use taskdeck_core::task::{Priority, Status, Task, UpdateTask};

/// The editable fields as the form presents them. Dates are `YYYY-MM-DD`
/// text, the assignee is free text, points is a numeric string.
#[derive(Debug, Clone, PartialEq)]
struct Fields {
    title: String,
    description: String,
    status: Status,
    priority: Priority,
    tags: String,
    start_date: String,
    due_date: String,
    points: String,
    assignee: String,
}

impl Fields {
    fn from_task(task: &Task) -> Self {
        Fields {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            status: task.status,
            priority: task.priority,
            tags: task.tags.clone().unwrap_or_default(),
            start_date: date_text(task.start_date),
            due_date: date_text(task.due_date),
            points: task.points.clone().unwrap_or_default(),
            assignee: task
                .assigned_user_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
        }
    }
}

/// Editing session for one task: a working copy diffed against the
/// snapshot taken when the form opened. Submission sends only the fields
/// that actually changed.
#[derive(Debug, Clone)]
pub struct TaskEditor {
    task_id: i64,
    snapshot: Fields,
    working: Fields,
}

impl TaskEditor {
    pub fn new(task: &Task) -> Self {
        let snapshot = Fields::from_task(task);
        TaskEditor {
            task_id: task.id,
            working: snapshot.clone(),
            snapshot,
        }
    }

    pub fn task_id(&self) -> i64 {
        self.task_id
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.working.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.working.description = description.into();
    }

    pub fn set_status(&mut self, status: Status) {
        self.working.status = status;
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.working.priority = priority;
    }

    pub fn set_tags(&mut self, tags: impl Into<String>) {
        self.working.tags = tags.into();
    }

    pub fn set_start_date(&mut self, text: impl Into<String>) {
        self.working.start_date = text.into();
    }

    pub fn set_due_date(&mut self, text: impl Into<String>) {
        self.working.due_date = text.into();
    }

    pub fn set_points(&mut self, points: impl Into<String>) {
        self.working.points = points.into();
    }

    pub fn set_assignee(&mut self, text: impl Into<String>) {
        self.working.assignee = text.into();
    }

    /// Whether any field differs from the snapshot. Submission is gated
    /// on this.
    pub fn has_changes(&self) -> bool {
        self.working != self.snapshot
    }

    /// Drops the working copy, returning every field to the snapshot.
    pub fn cancel(&mut self) {
        self.working = self.snapshot.clone();
    }

    /// After a successful submit, the working copy becomes the new
    /// snapshot for further edits.
    pub fn commit(&mut self) {
        self.snapshot = self.working.clone();
    }

    /// The patch covering exactly the changed fields. Date text is sent
    /// only when it parses; empty or malformed text leaves the stored
    /// date as it was. Assignee text becomes a user id when numeric and
    /// clears the assignment otherwise.
    pub fn build_patch(&self) -> UpdateTask {
        let mut patch = UpdateTask::default();
        if self.working.title != self.snapshot.title {
            patch.title = Some(self.working.title.clone());
        }
        if self.working.description != self.snapshot.description {
            patch.description = Some(self.working.description.clone());
        }
        if self.working.status != self.snapshot.status {
            patch.status = Some(self.working.status);
        }
        if self.working.priority != self.snapshot.priority {
            patch.priority = Some(self.working.priority);
        }
        if self.working.tags != self.snapshot.tags {
            patch.tags = Some(self.working.tags.clone());
        }
        if self.working.start_date != self.snapshot.start_date {
            if let Some(instant) = parse_date_text(&self.working.start_date) {
                patch.start_date = Some(Some(instant));
            }
        }
        if self.working.due_date != self.snapshot.due_date {
            if let Some(instant) = parse_date_text(&self.working.due_date) {
                patch.due_date = Some(Some(instant));
            }
        }
        if self.working.points != self.snapshot.points {
            patch.points = Some(self.working.points.clone());
        }
        if self.working.assignee != self.snapshot.assignee {
            patch.assigned_user_id = Some(parse_assignee_text(&self.working.assignee));
        }
        patch
    }
}

fn date_text(instant: Option<DateTime<Utc>>) -> String {
    instant
        .map(|d| d.date_naive().to_string())
        .unwrap_or_default()
}

/// `YYYY-MM-DD` text to a UTC instant at midnight. Anything else is
/// treated as absent.
fn parse_date_text(text: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

/// A positive numeric id assigns; empty, zero or non-numeric text
/// clears the assignment.
fn parse_assignee_text(text: &str) -> Option<i64> {
    match text.trim().parse::<i64>() {
        Ok(id) if id > 0 => Some(id),
        _ => None,
    }
}

//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record shared by repository, store and views.
//! - Normalize raw form input (trimmed text, comma-separated tags).
//!
//! # Invariants
//! - `title` is never blank after normalization.
//! - `id` and `created_at` are assigned once and never change on edit.
//! - `status` is always one of `Pending`, `In Progress`, `Done`.
//!
//! # See also
//! - store::task_store for the persisted wire layout.

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a task. Never reused, even after deletion.
pub type TaskId = Uuid;

/// Task lifecycle state.
///
/// Wire labels are the user-facing strings, including the space in
/// `In Progress`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Created but not started.
    #[default]
    Pending,
    /// Work is in progress.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Completed.
    Done,
}

impl TaskStatus {
    /// All statuses in display order.
    pub const ALL: [TaskStatus; 3] = [Self::Pending, Self::InProgress, Self::Done];

    /// Returns the exact wire/display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }

    /// Parses an exact, case-sensitive status label.
    pub fn parse(value: &str) -> Result<Self, TaskValidationError> {
        Self::ALL
            .into_iter()
            .find(|status| status.label() == value)
            .ok_or_else(|| TaskValidationError::InvalidStatus(value.to_string()))
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Validation failures for task input and decoded records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title is empty or whitespace-only.
    EmptyTitle,
    /// Status text is not one of the known labels.
    InvalidStatus(String),
    /// Nil UUID cannot identify a task.
    NilId,
    /// A persisted record lacks a field that only the repository assigns.
    MissingField(&'static str),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title is required"),
            Self::InvalidStatus(value) => write!(
                f,
                "invalid status `{value}`; expected Pending|In Progress|Done"
            ),
            Self::NilId => write!(f, "task id must not be nil"),
            Self::MissingField(field) => write!(f, "task record is missing `{field}`"),
        }
    }
}

impl Error for TaskValidationError {}

/// Mutable task fields as submitted by a form.
///
/// `TaskInput::normalize` is applied by the repository before any write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskInput {
    pub title: String,
    pub description: String,
    pub due_date: Option<String>,
    pub assignee: Option<String>,
    pub tags: Vec<String>,
    pub status: TaskStatus,
}

impl TaskInput {
    /// Creates an input with only a title; every other field is defaulted.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Replaces tags from a raw comma-separated form field.
    pub fn with_tag_field(mut self, raw: &str) -> Self {
        self.tags = split_tag_field(raw);
        self
    }

    /// Trims text fields, drops blank optionals and empty tags, then checks
    /// that a title remains.
    pub fn normalize(self) -> Result<Self, TaskValidationError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }

        Ok(Self {
            title,
            description: self.description.trim().to_string(),
            due_date: non_blank(self.due_date),
            assignee: non_blank(self.assignee),
            tags: normalize_tags(self.tags),
            status: self.status,
        })
    }
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "TaskRecord")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub due_date: Option<String>,
    pub assignee: Option<String>,
    pub tags: Vec<String>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Builds a task from already-normalized input.
    pub(crate) fn from_input(id: TaskId, input: TaskInput, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            due_date: input.due_date,
            assignee: input.assignee,
            tags: input.tags,
            status: input.status,
            created_at,
        }
    }

    /// Replaces every mutable field. `id` and `created_at` are untouched.
    pub(crate) fn apply(&mut self, input: TaskInput) {
        self.title = input.title;
        self.description = input.description;
        self.due_date = input.due_date;
        self.assignee = input.assignee;
        self.tags = input.tags;
        self.status = input.status;
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(())
    }

    /// Parses `due_date` as a calendar date.
    ///
    /// Accepts `YYYY-MM-DD` (date input value) or an RFC 3339 timestamp.
    /// Returns `None` when absent or unparseable.
    pub fn due_date_value(&self) -> Option<NaiveDate> {
        let raw = self.due_date.as_deref()?.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| {
                DateTime::parse_from_rfc3339(raw)
                    .ok()
                    .map(|value| value.date_naive())
            })
    }

    /// Returns the editable fields of this task, e.g. to prefill an edit form.
    pub fn to_input(&self) -> TaskInput {
        TaskInput {
            title: self.title.clone(),
            description: self.description.clone(),
            due_date: self.due_date.clone(),
            assignee: self.assignee.clone(),
            tags: self.tags.clone(),
            status: self.status,
        }
    }
}

/// Import/decoding shape for tasks.
///
/// Identical to [`Task`] except that `id` and `createdAt` may be absent;
/// bulk import fills them in. An `id` that is not a UUID, such as the
/// millisecond timestamps of older blobs, decodes as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    #[serde(default, deserialize_with = "uuid_or_none")]
    pub id: Option<TaskId>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub assignee: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    /// Creates a record without identity; useful for seed data.
    pub fn new(input: TaskInput) -> Self {
        Self {
            id: None,
            title: input.title,
            description: input.description,
            due_date: input.due_date,
            assignee: input.assignee,
            tags: input.tags,
            status: input.status,
            created_at: None,
        }
    }

    /// Splits the record into its editable fields and assigned metadata.
    pub(crate) fn into_parts(self) -> (Option<TaskId>, Option<DateTime<Utc>>, TaskInput) {
        let input = TaskInput {
            title: self.title,
            description: self.description,
            due_date: self.due_date,
            assignee: self.assignee,
            tags: self.tags,
            status: self.status,
        };
        (self.id, self.created_at, input)
    }
}

impl TryFrom<TaskRecord> for Task {
    type Error = TaskValidationError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let (id, created_at, input) = record.into_parts();
        let id = id.ok_or(TaskValidationError::MissingField("id"))?;
        let created_at = created_at.ok_or(TaskValidationError::MissingField("createdAt"))?;
        let task = Task::from_input(id, input.normalize()?, created_at);
        task.validate()?;
        Ok(task)
    }
}

/// Splits a comma-separated tag field into normalized tags.
pub fn split_tag_field(raw: &str) -> Vec<String> {
    normalize_tags(raw.split(','))
}

/// Trims tags and drops empty tokens. Order and duplicates are preserved.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|tag| tag.as_ref().trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Draws v4 ids until one is not `taken`.
pub(crate) fn generate_id(taken: impl Fn(TaskId) -> bool) -> TaskId {
    loop {
        let candidate = Uuid::new_v4();
        if !taken(candidate) {
            return candidate;
        }
    }
}

/// Current time at millisecond precision, matching the stored timestamp shape.
pub(crate) fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(non_blank(Option::<String>::deserialize(deserializer)?))
}

fn uuid_or_none<'de, D>(deserializer: D) -> Result<Option<TaskId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|text| Uuid::parse_str(text.trim()).ok()))
}

#[cfg(test)]
mod tests {
    use super::{split_tag_field, Task, TaskInput, TaskRecord, TaskStatus, TaskValidationError};

    #[test]
    fn split_tag_field_trims_and_keeps_duplicates() {
        assert_eq!(
            split_tag_field(" api, ,backend ,api,"),
            vec!["api".to_string(), "backend".to_string(), "api".to_string()]
        );
    }

    #[test]
    fn normalize_rejects_whitespace_title() {
        let err = TaskInput::new(" \t ").normalize().unwrap_err();
        assert_eq!(err, TaskValidationError::EmptyTitle);
    }

    #[test]
    fn status_parse_is_case_sensitive() {
        assert_eq!(
            TaskStatus::parse("In Progress").unwrap(),
            TaskStatus::InProgress
        );
        assert!(TaskStatus::parse("in progress").is_err());
        assert!(TaskStatus::parse("Blocked").is_err());
    }

    #[test]
    fn record_with_timestamp_id_decodes_without_identity() {
        let record: TaskRecord = serde_json::from_str(
            r#"{"id":"1728000000000","title":"Old","createdAt":"2024-10-04T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(record.id, None);
        assert_eq!(record.title, "Old");

        let err = serde_json::from_str::<Task>(
            r#"{"id":"1728000000000","title":"Old","createdAt":"2024-10-04T00:00:00Z"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("id"));
    }
}

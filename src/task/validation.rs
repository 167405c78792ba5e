//! Request payloads and the validator shared by create and update.
//!
//! Raw payloads carry loosely-typed fields so that a bad enumeration value is
//! reported as a field error rather than a body parse failure. Validation
//! turns them into `NewTask` / `TaskPatch`, which hold only legal values.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer};

use super::task::{Person, Priority, TaskStatus};

/// A field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Body of `POST /tasks`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    pub assigned_to: Option<String>,
    pub subtasks: Option<Vec<SubtaskInput>>,
    pub created_by: Option<Person>,
    pub assigned_by: Option<Person>,
}

/// Body of `PUT /tasks/:id`. Absent fields are left untouched; the optional
/// fields can be cleared with an explicit `null`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_to: Option<Option<String>>,
    pub subtasks: Option<Vec<SubtaskInput>>,
    #[serde(default, deserialize_with = "double_option")]
    pub created_by: Option<Option<Person>>,
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_by: Option<Option<Person>>,
}

/// A subtask as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubtaskInput {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// Validated input for a new task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub due_date: Option<String>,
    pub assigned_to: Option<String>,
    pub subtasks: Vec<SubtaskDraft>,
    pub created_by: Option<Person>,
    pub assigned_by: Option<Person>,
}

/// Validated partial update. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<String>>,
    pub assigned_to: Option<Option<String>>,
    pub subtasks: Option<Vec<SubtaskDraft>>,
    pub created_by: Option<Option<Person>>,
    pub assigned_by: Option<Option<Person>>,
}

/// Validated subtask awaiting an id.
#[derive(Debug, Clone)]
pub struct SubtaskDraft {
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub completed: bool,
}

impl SubtaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: String::new(),
            completed: false,
        }
    }
}

impl CreateTaskRequest {
    /// Check required fields in order (`title`, `description`, `status`,
    /// `priority`) and report the first failure.
    pub fn validate(self) -> Result<NewTask, ValidationError> {
        let title = required_text("title", self.title)?;
        let description = required_text("description", self.description)?;
        let status = parse_status("status", &required("status", self.status)?)?;
        let priority = parse_priority("priority", &required("priority", self.priority)?)?;
        let due_date = parse_due_date(self.due_date)?;
        let subtasks = subtask_drafts(self.subtasks.unwrap_or_default())?;

        Ok(NewTask {
            title,
            description,
            status,
            priority,
            due_date,
            assigned_to: optional_text(self.assigned_to),
            subtasks,
            created_by: self.created_by,
            assigned_by: self.assigned_by,
        })
    }
}

impl UpdateTaskRequest {
    /// Apply the create-time rules to the fields that are present.
    pub fn validate(self) -> Result<TaskPatch, ValidationError> {
        Ok(TaskPatch {
            title: self
                .title
                .map(|t| required_text("title", Some(t)))
                .transpose()?,
            description: self
                .description
                .map(|d| required_text("description", Some(d)))
                .transpose()?,
            status: self
                .status
                .map(|s| parse_status("status", &s))
                .transpose()?,
            priority: self
                .priority
                .map(|p| parse_priority("priority", &p))
                .transpose()?,
            due_date: self.due_date.map(parse_due_date).transpose()?,
            assigned_to: self.assigned_to.map(optional_text),
            subtasks: self.subtasks.map(subtask_drafts).transpose()?,
            created_by: self.created_by,
            assigned_by: self.assigned_by,
        })
    }
}

pub fn parse_status(field: &str, value: &str) -> Result<TaskStatus, ValidationError> {
    TaskStatus::parse(value).ok_or_else(|| {
        ValidationError::new(field, format!("must be one of: {}", allowed(&TaskStatus::ALL)))
    })
}

pub fn parse_priority(field: &str, value: &str) -> Result<Priority, ValidationError> {
    Priority::parse(value).ok_or_else(|| {
        ValidationError::new(field, format!("must be one of: {}", allowed(&Priority::ALL)))
    })
}

fn allowed<T: std::fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn required(field: &str, value: Option<String>) -> Result<String, ValidationError> {
    value.ok_or_else(|| ValidationError::new(field, "is required"))
}

fn required_text(field: &str, value: Option<String>) -> Result<String, ValidationError> {
    let value = required(field, value)?;
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(value)
}

/// Blank strings count as absent.
fn optional_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_due_date(value: Option<String>) -> Result<Option<String>, ValidationError> {
    let Some(value) = optional_text(value) else {
        return Ok(None);
    };
    let trimmed = value.trim();
    let valid = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_ok()
        || DateTime::parse_from_rfc3339(trimmed).is_ok();
    if !valid {
        return Err(ValidationError::new(
            "dueDate",
            "must be a date (YYYY-MM-DD) or an RFC 3339 timestamp",
        ));
    }
    Ok(Some(trimmed.to_string()))
}

fn subtask_drafts(inputs: Vec<SubtaskInput>) -> Result<Vec<SubtaskDraft>, ValidationError> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(i, input)| {
            let title = required_text(&format!("subtasks[{}].title", i), input.title)?;
            Ok(SubtaskDraft {
                id: input.id,
                title,
                description: input.description.unwrap_or_default(),
                completed: input.completed.unwrap_or(false),
            })
        })
        .collect()
}

/// Distinguishes a missing field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

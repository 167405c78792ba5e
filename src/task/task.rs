//! Core Task record and its enumerations.
//!
//! # Invariants
//! - `id` is unique across the collection
//! - `status` and `priority` are always one of their enumerated values
//! - `updated_at >= created_at`
//! - subtask ids are unique within a task

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::subtask::{assign_subtask_ids, Subtask};
use super::validation::{NewTask, TaskPatch};

/// Status of a task in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    /// Parse the wire form. Matching is exact.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    /// Parse the wire form. Matching is exact.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == value)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A person referenced by `createdBy` / `assignedBy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// A task record as persisted and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    /// `YYYY-MM-DD` or RFC 3339, kept as submitted
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Person>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_by: Option<Person>,
}

impl Task {
    /// Build a fresh record from validated input.
    ///
    /// # Postcondition
    /// `created_at == updated_at == now` and subtasks are numbered `<id>.1..n`.
    pub fn from_new(id: String, new: NewTask, now: DateTime<Utc>) -> Self {
        let subtasks = assign_subtask_ids(&id, &[], new.subtasks);
        Self {
            id,
            title: new.title,
            description: new.description,
            status: new.status,
            priority: new.priority,
            due_date: new.due_date,
            assigned_to: new.assigned_to,
            subtasks,
            created_at: now,
            updated_at: now,
            created_by: new.created_by,
            assigned_by: new.assigned_by,
        }
    }

    /// Merge a validated patch into this record. Absent fields keep their value.
    ///
    /// # Postcondition
    /// `updated_at` is strictly later than before.
    pub fn apply(&mut self, patch: TaskPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(assigned_to) = patch.assigned_to {
            self.assigned_to = assigned_to;
        }
        if let Some(created_by) = patch.created_by {
            self.created_by = created_by;
        }
        if let Some(assigned_by) = patch.assigned_by {
            self.assigned_by = assigned_by;
        }
        if let Some(drafts) = patch.subtasks {
            self.subtasks = assign_subtask_ids(&self.id, &self.subtasks, drafts);
        }
        self.updated_at = later_than(self.updated_at, now);
    }
}

/// Returns `now` if it is after `previous`, otherwise `previous` plus one microsecond.
pub fn later_than(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

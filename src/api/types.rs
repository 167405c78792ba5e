//! API request/response types.

use serde::{Deserialize, Serialize};

use crate::task::validation::{parse_priority, parse_status};
use crate::task::{Task, TaskFilter, ValidationError};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Active task store backend
    pub store: String,
    /// Whether the store survives restarts
    pub persistent: bool,
}

/// Query parameters for `GET /tasks`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTasksQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assigned_to: Option<String>,
    pub created_by: Option<String>,
    pub assigned_by: Option<String>,
}

impl ListTasksQuery {
    /// Validate enumeration filters. Blank parameters are ignored.
    pub fn into_filter(self) -> Result<TaskFilter, ValidationError> {
        Ok(TaskFilter {
            status: non_blank(self.status)
                .map(|s| parse_status("status", &s))
                .transpose()?,
            priority: non_blank(self.priority)
                .map(|p| parse_priority("priority", &p))
                .transpose()?,
            assigned_to: non_blank(self.assigned_to),
            created_by: non_blank(self.created_by),
            assigned_by: non_blank(self.assigned_by),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Response for `GET /tasks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListTasksResponse {
    pub tasks: Vec<Task>,
    pub count: usize,
}

impl From<Vec<Task>> for ListTasksResponse {
    fn from(tasks: Vec<Task>) -> Self {
        Self {
            count: tasks.len(),
            tasks,
        }
    }
}

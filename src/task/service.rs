//! Task record service: list, get, create, update and delete over a `TaskStore`.
//!
//! Mutations are serialized by an async mutex so two concurrent
//! read-modify-write sequences can never lose each other's changes.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::task::{Person, Priority, Task, TaskStatus};
use super::validation::{CreateTaskRequest, UpdateTaskRequest, ValidationError};
use crate::api::task_store::{StoreError, TaskStore};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Task {0} not found")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Narrowing applied by `TaskService::list`. Empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    /// Case-insensitive substring of `assignedTo`
    pub assigned_to: Option<String>,
    /// Case-insensitive substring of `createdBy.name`
    pub created_by: Option<String>,
    /// Case-insensitive substring of `assignedBy.name`
    pub assigned_by: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if self.status.is_some_and(|s| s != task.status) {
            return false;
        }
        if self.priority.is_some_and(|p| p != task.priority) {
            return false;
        }
        if let Some(needle) = &self.assigned_to {
            if !contains_ignore_case(task.assigned_to.as_deref(), needle) {
                return false;
            }
        }
        if let Some(needle) = &self.created_by {
            if !contains_ignore_case(person_name(&task.created_by), needle) {
                return false;
            }
        }
        if let Some(needle) = &self.assigned_by {
            if !contains_ignore_case(person_name(&task.assigned_by), needle) {
                return false;
            }
        }
        true
    }
}

fn person_name(person: &Option<Person>) -> Option<&str> {
    person.as_ref().map(|p| p.name.as_str())
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack
        .map(|h| h.to_lowercase().contains(&needle.to_lowercase()))
        .unwrap_or(false)
}

pub struct TaskService {
    store: Arc<dyn TaskStore>,
    write_lock: Mutex<()>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &dyn TaskStore {
        self.store.as_ref()
    }

    /// All tasks matching `filter`, in stored order.
    pub async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>, ServiceError> {
        let tasks = self.store.list().await?;
        Ok(tasks.into_iter().filter(|t| filter.matches(t)).collect())
    }

    pub async fn get(&self, id: &str) -> Result<Task, ServiceError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    pub async fn create(&self, req: CreateTaskRequest) -> Result<Task, ServiceError> {
        let new = req.validate()?;
        let task = Task::from_new(Uuid::new_v4().to_string(), new, Utc::now());

        let _guard = self.write_lock.lock().await;
        self.store.insert(&task).await?;
        tracing::info!(task_id = %task.id, "Created task: {}", task.title);
        Ok(task)
    }

    /// Merge `req` into the task. Validation runs before the lookup, so an
    /// invalid patch is rejected even for an unknown id.
    pub async fn update(&self, id: &str, req: UpdateTaskRequest) -> Result<Task, ServiceError> {
        let patch = req.validate()?;

        let _guard = self.write_lock.lock().await;
        let mut task = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;
        task.apply(patch, Utc::now());
        if !self.store.replace(&task).await? {
            return Err(ServiceError::NotFound(id.to_string()));
        }
        tracing::info!(task_id = %task.id, status = %task.status, "Updated task");
        Ok(task)
    }

    pub async fn delete(&self, id: &str) -> Result<Task, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let task = self
            .store
            .remove(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;
        tracing::info!(task_id = %task.id, "Deleted task");
        Ok(task)
    }
}

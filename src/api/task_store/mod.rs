//! Task storage module with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for testing)
//! - `file`: a single JSON document holding the ordered task array
//! - `sqlite`: SQLite database, one row per task

mod file;
mod memory;
mod sqlite;

pub use file::FileTaskStore;
pub use memory::InMemoryTaskStore;
pub use sqlite::SqliteTaskStore;

use crate::task::Task;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

/// Errors raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to {action} task store {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse task store {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize tasks: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Task {0} already exists")]
    Conflict(String),

    #[error("Task store worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Task store trait - implemented by all storage backends.
///
/// Backends keep tasks in insertion order. They do not validate records and
/// do not coordinate read-modify-write sequences; callers serialize those.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Whether this store persists data across restarts.
    fn is_persistent(&self) -> bool;

    /// All tasks in insertion order.
    async fn list(&self) -> Result<Vec<Task>, StoreError>;

    /// Get a single task by ID.
    async fn get(&self, id: &str) -> Result<Option<Task>, StoreError>;

    /// Append a task. Fails with `StoreError::Conflict` if the id is taken.
    async fn insert(&self, task: &Task) -> Result<(), StoreError>;

    /// Overwrite the task with the same id in place. Returns `false` if absent.
    async fn replace(&self, task: &Task) -> Result<bool, StoreError>;

    /// Remove a task, returning it if it existed.
    async fn remove(&self, id: &str) -> Result<Option<Task>, StoreError>;
}

/// Task store type selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskStoreType {
    Memory,
    #[default]
    File,
    Sqlite,
}

impl TaskStoreType {
    /// Parse from environment variable value.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "file" | "json" => Some(Self::File),
            "sqlite" | "db" => Some(Self::Sqlite),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::File => "file",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Create a task store based on type and backing path.
pub async fn create_task_store(
    store_type: TaskStoreType,
    path: PathBuf,
) -> Result<Arc<dyn TaskStore>, StoreError> {
    match store_type {
        TaskStoreType::Memory => Ok(Arc::new(InMemoryTaskStore::new())),
        TaskStoreType::File => {
            let store = FileTaskStore::new(path).await?;
            Ok(Arc::new(store))
        }
        TaskStoreType::Sqlite => {
            let store = SqliteTaskStore::new(path).await?;
            Ok(Arc::new(store))
        }
    }
}

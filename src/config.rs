//! Configuration management for the task record service.
//!
//! Configuration can be set via environment variables:
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `WORKING_DIR` - Optional. Base directory for data files. Defaults to current directory.
//! - `TASK_STORE` - Optional. `memory`, `file` or `sqlite`. Defaults to `file`.
//! - `TASKS_FILE` - Optional. Path of the backing file. Defaults to
//!   `{WORKING_DIR}/data/tasks.json` (or `tasks.db` for the sqlite store).

use std::path::PathBuf;
use thiserror::Error;

use crate::api::task_store::TaskStoreType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Base directory for data files
    pub working_dir: PathBuf,

    /// Which task store backend to use
    pub store_type: TaskStoreType,

    /// Location of the backing file (ignored by the memory store)
    pub tasks_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `PORT` or `TASK_STORE` cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let working_dir = std::env::var("WORKING_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        let store_type = match std::env::var("TASK_STORE") {
            Ok(value) => TaskStoreType::parse(&value).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "TASK_STORE".to_string(),
                    format!("expected memory, file or sqlite, got {:?}", value),
                )
            })?,
            Err(_) => TaskStoreType::default(),
        };

        let tasks_path = match std::env::var("TASKS_FILE") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_tasks_path(&working_dir, store_type),
        };

        Ok(Self {
            host,
            port,
            working_dir,
            store_type,
            tasks_path,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(working_dir: PathBuf, store_type: TaskStoreType) -> Self {
        let tasks_path = default_tasks_path(&working_dir, store_type);
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            working_dir,
            store_type,
            tasks_path,
        }
    }
}

fn default_tasks_path(working_dir: &std::path::Path, store_type: TaskStoreType) -> PathBuf {
    let filename = match store_type {
        TaskStoreType::Sqlite => "tasks.db",
        TaskStoreType::Memory | TaskStoreType::File => "tasks.json",
    };
    working_dir.join("data").join(filename)
}

//! JSON file-based task store.
//!
//! The file holds one JSON array of tasks. Every operation reads the whole
//! document from disk; every mutation rewrites it through a temp file and a
//! rename so readers never observe a partial write.

use super::{StoreError, TaskStore};
use crate::task::Task;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;

pub struct FileTaskStore {
    path: PathBuf,
    persist_lock: Mutex<()>,
}

impl FileTaskStore {
    /// Open the store at `path`, creating parent directories as needed.
    ///
    /// An existing file is parsed once up front so a corrupt document is
    /// reported at startup. A missing file is an empty collection.
    pub async fn new(path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io {
                    action: "create directory for",
                    path: path.clone(),
                    source,
                })?;
        }

        let store = Self {
            path,
            persist_lock: Mutex::new(()),
        };
        let tasks = store.load().await?;
        tracing::info!(
            "Opened task file {} ({} tasks)",
            store.path.display(),
            tasks.len()
        );
        Ok(store)
    }

    async fn load(&self) -> Result<Vec<Task>, StoreError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    action: "read",
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    async fn persist(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(tasks)?;
        let mut tmp_path = self.path.clone().into_os_string();
        tmp_path.push(".tmp");
        let tmp_path = PathBuf::from(tmp_path);

        fs::write(&tmp_path, data)
            .await
            .map_err(|source| StoreError::Io {
                action: "write",
                path: tmp_path.clone(),
                source,
            })?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| StoreError::Io {
                action: "finalize",
                path: self.path.clone(),
                source,
            })?;
        tracing::debug!("Saved {} tasks to {}", tasks.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl TaskStore for FileTaskStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn list(&self) -> Result<Vec<Task>, StoreError> {
        self.load().await
    }

    async fn get(&self, id: &str) -> Result<Option<Task>, StoreError> {
        Ok(self.load().await?.into_iter().find(|t| t.id == id))
    }

    async fn insert(&self, task: &Task) -> Result<(), StoreError> {
        let _guard = self.persist_lock.lock().await;
        let mut tasks = self.load().await?;
        if tasks.iter().any(|t| t.id == task.id) {
            return Err(StoreError::Conflict(task.id.clone()));
        }
        tasks.push(task.clone());
        self.persist(&tasks).await
    }

    async fn replace(&self, task: &Task) -> Result<bool, StoreError> {
        let _guard = self.persist_lock.lock().await;
        let mut tasks = self.load().await?;
        let Some(slot) = tasks.iter_mut().find(|t| t.id == task.id) else {
            return Ok(false);
        };
        *slot = task.clone();
        self.persist(&tasks).await?;
        Ok(true)
    }

    async fn remove(&self, id: &str) -> Result<Option<Task>, StoreError> {
        let _guard = self.persist_lock.lock().await;
        let mut tasks = self.load().await?;
        let Some(index) = tasks.iter().position(|t| t.id == id) else {
            return Ok(None);
        };
        let removed = tasks.remove(index);
        self.persist(&tasks).await?;
        Ok(Some(removed))
    }
}

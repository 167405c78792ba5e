//! SQLite-based task store.
//!
//! Each row holds one task serialized as JSON. `seq` preserves insertion
//! order and survives in-place replacement.

use super::{StoreError, TaskStore};
use crate::task::Task;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

const SCHEMA: &str = r#"
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS tasks (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    document TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

pub struct SqliteTaskStore {
    conn: Arc<Mutex<Connection>>,
    db_path: PathBuf,
}

impl SqliteTaskStore {
    pub async fn new(db_path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io {
                    action: "create directory for",
                    path: db_path.clone(),
                    source,
                })?;
        }

        // Open database in blocking task
        let path = db_path.clone();
        let conn = tokio::task::spawn_blocking(move || -> Result<Connection, StoreError> {
            let conn = Connection::open(&path)?;
            conn.execute_batch(SCHEMA)?;
            Ok(conn)
        })
        .await??;

        tracing::info!("Opened task database {}", db_path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            db_path,
        })
    }

    fn decode(db_path: &std::path::Path, document: &str) -> Result<Task, StoreError> {
        serde_json::from_str(document).map_err(|source| StoreError::Parse {
            path: db_path.to_path_buf(),
            source,
        })
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn list(&self) -> Result<Vec<Task>, StoreError> {
        let conn = self.conn.clone();
        let db_path = self.db_path.clone();

        tokio::task::spawn_blocking(move || -> Result<Vec<Task>, StoreError> {
            let conn = conn.blocking_lock();
            let mut stmt = conn.prepare("SELECT document FROM tasks ORDER BY seq")?;
            let documents = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            documents
                .iter()
                .map(|doc| Self::decode(&db_path, doc))
                .collect()
        })
        .await?
    }

    async fn get(&self, id: &str) -> Result<Option<Task>, StoreError> {
        let conn = self.conn.clone();
        let db_path = self.db_path.clone();
        let id = id.to_string();

        tokio::task::spawn_blocking(move || -> Result<Option<Task>, StoreError> {
            let conn = conn.blocking_lock();
            let document: Option<String> = conn
                .query_row(
                    "SELECT document FROM tasks WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;
            document.map(|doc| Self::decode(&db_path, &doc)).transpose()
        })
        .await?
    }

    async fn insert(&self, task: &Task) -> Result<(), StoreError> {
        let conn = self.conn.clone();
        let document = serde_json::to_string(task)?;
        let id = task.id.clone();
        let updated_at = task.updated_at.to_rfc3339();

        tokio::task::spawn_blocking(move || -> Result<(), StoreError> {
            let conn = conn.blocking_lock();
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO tasks (id, document, updated_at) VALUES (?1, ?2, ?3)",
                params![id, document, updated_at],
            )?;
            if inserted == 0 {
                return Err(StoreError::Conflict(id));
            }
            Ok(())
        })
        .await?
    }

    async fn replace(&self, task: &Task) -> Result<bool, StoreError> {
        let conn = self.conn.clone();
        let document = serde_json::to_string(task)?;
        let id = task.id.clone();
        let updated_at = task.updated_at.to_rfc3339();

        tokio::task::spawn_blocking(move || -> Result<bool, StoreError> {
            let conn = conn.blocking_lock();
            let changed = conn.execute(
                "UPDATE tasks SET document = ?1, updated_at = ?2 WHERE id = ?3",
                params![document, updated_at, id],
            )?;
            Ok(changed > 0)
        })
        .await?
    }

    async fn remove(&self, id: &str) -> Result<Option<Task>, StoreError> {
        let conn = self.conn.clone();
        let db_path = self.db_path.clone();
        let id = id.to_string();

        tokio::task::spawn_blocking(move || -> Result<Option<Task>, StoreError> {
            let mut conn = conn.blocking_lock();
            let tx = conn.transaction()?;
            let document: Option<String> = tx
                .query_row(
                    "SELECT document FROM tasks WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(document) = document else {
                return Ok(None);
            };
            // An undecodable row stays put; the transaction rolls back on drop.
            let task = Self::decode(&db_path, &document)?;
            tx.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
            tx.commit()?;
            Ok(Some(task))
        })
        .await?
    }
}

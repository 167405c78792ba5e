//! HTTP API for the task record service.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /tasks` - List tasks, with optional `status`, `priority`, `assignedTo`,
//!   `createdBy` and `assignedBy` filters
//! - `POST /tasks` - Create a task
//! - `GET /tasks/{id}` - Get a task
//! - `PUT /tasks/{id}` - Partially update a task
//! - `DELETE /tasks/{id}` - Delete a task

pub mod error;
mod routes;
pub mod task_store;
mod tasks;
pub mod types;

pub use error::ApiError;
pub use routes::{router, serve, AppState};
pub use types::*;

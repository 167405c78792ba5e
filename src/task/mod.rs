//! Task module - the task record model, its validator, and the service that
//! performs CRUD over a `TaskStore`.

pub mod service;
mod subtask;
pub mod task;
pub mod validation;

pub use service::{ServiceError, TaskFilter, TaskService};
pub use subtask::Subtask;
pub use task::{Person, Priority, Task, TaskStatus};
pub use validation::{CreateTaskRequest, SubtaskInput, UpdateTaskRequest, ValidationError};

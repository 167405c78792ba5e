//! # Task Records
//!
//! A small REST service for tasks and their subtasks.
//!
//! This library provides:
//! - The task record model with a single validator shared by create and update
//! - A `TaskService` that serializes read-modify-write sequences
//! - Pluggable storage: in-memory, a JSON document on disk, or SQLite
//! - An axum router exposing the CRUD endpoints under `/tasks`
//!
//! ## Request Flow
//! 1. Handler extracts and deserializes the request
//! 2. `TaskService` validates input and talks to the `TaskStore`
//! 3. Errors map to 400 (validation), 404 (not found) or 500 (store)
//!
//! ## Modules
//! - `task`: records, validation, and the service
//! - `api`: HTTP handlers, error mapping, and task stores
//! - `config`: environment-driven configuration

pub mod api;
pub mod config;
pub mod task;

pub use config::Config;
pub use task::{Task, TaskService};

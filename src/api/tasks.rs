//! Task record API endpoints.
//!
//! - `GET /tasks` - List tasks (filters: status, priority, assignedTo, createdBy, assignedBy)
//! - `POST /tasks` - Create a task
//! - `GET /tasks/:id` - Get a task
//! - `PUT /tasks/:id` - Partially update a task
//! - `DELETE /tasks/:id` - Delete a task

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use super::error::ApiError;
use super::routes::AppState;
use super::types::{ListTasksQuery, ListTasksResponse};
use crate::task::{CreateTaskRequest, Task, UpdateTaskRequest};

/// Create task routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
}

/// GET /tasks - List tasks, optionally filtered.
async fn list_tasks(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> Result<Json<ListTasksResponse>, ApiError> {
    let Query(query) = query?;
    let filter = query.into_filter()?;
    let tasks = state.tasks.list(&filter).await?;
    Ok(Json(tasks.into()))
}

/// GET /tasks/:id - Get a single task.
async fn get_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    Ok(Json(state.tasks.get(&id).await?))
}

/// POST /tasks - Create a new task.
async fn create_task(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(req) = payload?;
    let task = state.tasks.create(req).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /tasks/:id - Merge the given fields into a task.
async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let Json(req) = payload?;
    Ok(Json(state.tasks.update(&id, req).await?))
}

/// DELETE /tasks/:id - Delete a task, returning it.
async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Task>, ApiError> {
    Ok(Json(state.tasks.delete(&id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes::router;
    use crate::api::task_store::{FileTaskStore, InMemoryTaskStore, TaskStoreType};
    use crate::config::Config;
    use crate::task::{TaskService, TaskStatus};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app_state() -> Arc<AppState> {
        let config = Config::new(std::env::temp_dir(), TaskStoreType::Memory);
        Arc::new(AppState {
            config,
            tasks: TaskService::new(Arc::new(InMemoryTaskStore::new())),
        })
    }

    async fn send(
        state: &Arc<AppState>,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router(Arc::clone(state)).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    fn task_body(title: &str, status: &str) -> Value {
        json!({
            "title": title,
            "description": "Something to do",
            "status": status,
            "priority": "high"
        })
    }

    #[tokio::test]
    async fn create_returns_201_with_new_id() {
        let state = app_state();

        let (status, first) = send(
            &state,
            Method::POST,
            "/tasks",
            Some(task_body("one", "pending")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let (_, second) = send(
            &state,
            Method::POST,
            "/tasks",
            Some(task_body("two", "pending")),
        )
        .await;

        let first_id = first["id"].as_str().unwrap();
        let second_id = second["id"].as_str().unwrap();
        assert!(!first_id.is_empty());
        assert_ne!(first_id, second_id);
        assert_eq!(first["subtasks"], json!([]));
        assert!(first["dueDate"].is_null());
        assert_eq!(first["createdAt"], first["updatedAt"]);
    }

    #[tokio::test]
    async fn create_without_title_is_400_and_stores_nothing() {
        let state = app_state();
        let mut body = task_body("ignored", "pending");
        body.as_object_mut().unwrap().remove("title");

        let (status, error) = send(&state, Method::POST, "/tasks", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "validation");
        assert_eq!(error["field"], "title");

        let (_, list) = send(&state, Method::GET, "/tasks", None).await;
        assert_eq!(list["count"], 0);
    }

    #[tokio::test]
    async fn malformed_body_is_400() {
        let state = app_state();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/tasks")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"title\": "))
            .unwrap();

        let response = router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_update_body_is_400_and_record_unchanged() {
        let state = app_state();
        let (_, created) = send(
            &state,
            Method::POST,
            "/tasks",
            Some(task_body("steady", "pending")),
        )
        .await;
        let uri = format!("/tasks/{}", created["id"].as_str().unwrap());

        let request = Request::builder()
            .method(Method::PUT)
            .uri(&uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"status\": "))
            .unwrap();
        let response = router(Arc::clone(&state)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let error: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(error["error"], "bad_request");

        let (_, fetched) = send(&state, Method::GET, &uri, None).await;
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn repeated_query_field_is_json_400() {
        let state = app_state();
        let (status, error) = send(
            &state,
            Method::GET,
            "/tasks?status=pending&status=completed",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["error"], "bad_request");
        assert!(error["message"].as_str().unwrap().contains("status"));
    }

    #[tokio::test]
    async fn update_with_null_clears_assignee() {
        let state = app_state();
        let mut body = task_body("handoff", "pending");
        body["assignedTo"] = json!("Grace");
        body["dueDate"] = json!("2026-11-01");
        let (_, created) = send(&state, Method::POST, "/tasks", Some(body)).await;
        assert_eq!(created["assignedTo"], "Grace");
        let uri = format!("/tasks/{}", created["id"].as_str().unwrap());

        let (status, updated) =
            send(&state, Method::PUT, &uri, Some(json!({ "assignedTo": null }))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(updated["assignedTo"].is_null());
        assert_eq!(updated["dueDate"], "2026-11-01");
        assert_eq!(updated["title"], "handoff");

        let (_, fetched) = send(&state, Method::GET, &uri, None).await;
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn get_by_id_returns_exact_record() {
        let state = app_state();
        let (_, created) = send(
            &state,
            Method::POST,
            "/tasks",
            Some(task_body("find me", "pending")),
        )
        .await;
        let id = created["id"].as_str().unwrap();

        let (status, fetched) = send(&state, Method::GET, &format!("/tasks/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let (status, error) = send(&state, Method::GET, "/tasks/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error["error"], "not_found");
    }

    #[tokio::test]
    async fn invalid_status_update_is_400_and_record_unchanged() {
        let state = app_state();
        let (_, created) = send(
            &state,
            Method::POST,
            "/tasks",
            Some(task_body("keep", "pending")),
        )
        .await;
        let uri = format!("/tasks/{}", created["id"].as_str().unwrap());

        let (status, error) =
            send(&state, Method::PUT, &uri, Some(json!({ "status": "paused" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["field"], "status");

        let (_, fetched) = send(&state, Method::GET, &uri, None).await;
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn update_unknown_id_is_404() {
        let state = app_state();
        let (status, _) =
            send(&state, Method::PUT, "/tasks/ghost", Some(json!({ "title": "x" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_twice_is_200_then_404() {
        let state = app_state();
        let (_, created) = send(
            &state,
            Method::POST,
            "/tasks",
            Some(task_body("bye", "pending")),
        )
        .await;
        let uri = format!("/tasks/{}", created["id"].as_str().unwrap());

        let (status, deleted) = send(&state, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted, created);

        let (status, _) = send(&state, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_filters_by_status_in_order() {
        let state = app_state();
        for (title, status) in [
            ("first", "completed"),
            ("second", "pending"),
            ("third", "completed"),
        ] {
            send(&state, Method::POST, "/tasks", Some(task_body(title, status))).await;
        }

        let (status, list) = send(&state, Method::GET, "/tasks?status=completed", None).await;
        assert_eq!(status, StatusCode::OK);
        let response: ListTasksResponse = serde_json::from_value(list).unwrap();
        assert_eq!(response.count, 2);
        let titles: Vec<&str> = response.tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "third"]);
        assert!(response
            .tasks
            .iter()
            .all(|t| t.status == TaskStatus::Completed));

        let (status, error) = send(&state, Method::GET, "/tasks?status=someday", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["field"], "status");
    }

    #[tokio::test]
    async fn round_trip_reflects_update() {
        let state = app_state();
        let (_, created) = send(
            &state,
            Method::POST,
            "/tasks",
            Some(task_body("draft", "pending")),
        )
        .await;
        let uri = format!("/tasks/{}", created["id"].as_str().unwrap());

        let (status, updated) = send(
            &state,
            Method::PUT,
            &uri,
            Some(json!({
                "title": "final",
                "status": "in-progress",
                "subtasks": [{ "title": "review", "completed": true }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, fetched) = send(&state, Method::GET, &uri, None).await;
        assert_eq!(fetched, updated);
        let before: Task = serde_json::from_value(created).unwrap();
        let after: Task = serde_json::from_value(fetched).unwrap();
        assert_eq!(after.title, "final");
        assert_eq!(after.status, TaskStatus::InProgress);
        assert_eq!(after.description, before.description);
        assert_eq!(after.subtasks[0].id, format!("{}.1", after.id));
        assert!(after.subtasks[0].completed);
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn store_failure_is_500() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tasks.json");
        let store = FileTaskStore::new(path.clone()).await.unwrap();
        let state = Arc::new(AppState {
            config: Config::new(dir.path().to_path_buf(), TaskStoreType::File),
            tasks: TaskService::new(Arc::new(store)),
        });
        std::fs::write(&path, "not json at all").unwrap();

        let (status, error) = send(&state, Method::GET, "/tasks", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error["error"], "store");
    }

    #[tokio::test]
    async fn health_reports_store() {
        let state = app_state();
        let (status, health) = send(&state, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], "ok");
        assert_eq!(health["store"], "memory");
        assert_eq!(health["persistent"], false);
    }
}

//! Subtasks nested under a task.
//!
//! Subtask ids are scoped to their parent as `<taskId>.<n>`, with `n` starting at 1.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::validation::SubtaskDraft;

/// A step within a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

impl Subtask {
    /// The `n` in `<taskId>.<n>`, if this id belongs to `task_id`.
    pub fn sequence(&self, task_id: &str) -> Option<u32> {
        self.id
            .strip_prefix(task_id)
            .and_then(|rest| rest.strip_prefix('.'))
            .and_then(|n| n.parse().ok())
    }
}

/// Turn drafts into subtasks with ids unique within the task.
///
/// A draft that names the id of one of `existing` keeps it (once). Every other
/// draft is numbered from one past the highest sequence in `existing`.
pub fn assign_subtask_ids(
    task_id: &str,
    existing: &[Subtask],
    drafts: Vec<SubtaskDraft>,
) -> Vec<Subtask> {
    let known: HashSet<&str> = existing.iter().map(|s| s.id.as_str()).collect();
    let mut next = existing
        .iter()
        .filter_map(|s| s.sequence(task_id))
        .max()
        .unwrap_or(0)
        + 1;
    let mut taken: HashSet<String> = HashSet::new();

    drafts
        .into_iter()
        .map(|draft| {
            let id = match draft.id {
                Some(id) if known.contains(id.as_str()) && !taken.contains(&id) => id,
                _ => {
                    let id = format!("{}.{}", task_id, next);
                    next += 1;
                    id
                }
            };
            taken.insert(id.clone());
            Subtask {
                id,
                title: draft.title,
                description: draft.description,
                completed: draft.completed,
            }
        })
        .collect()
}

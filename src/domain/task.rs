use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One user-owned to-do item as stored. Subtasks and tags live in their own
/// tables and are attached to a task only inside the derived view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Human-facing sequential id, unique within one user's task set.
    /// Subtask and tag-join rows reference this, not the storage id.
    pub task_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    /// None when the stored value was missing or unrecognized; such tasks
    /// rank after low priority when sorting.
    pub priority: Option<Priority>,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubTask {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Parent task's human-facing id.
    pub task_id: i64,
    /// Sequential within the parent task.
    pub subtask_id: i64,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Task {
    pub fn new(user_id: Uuid, task_id: i64, title: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            task_id,
            title,
            description: None,
            status: TaskStatus::Todo,
            priority: Some(Priority::Medium),
            due_date: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn update_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.updated_at = Utc::now();

        if status == TaskStatus::Completed {
            self.completed_at = Some(Utc::now());
        } else {
            self.completed_at = None;
        }
    }

    /// Overdue means the due date is strictly in the past and the task is
    /// not completed. A task due exactly at `now` is not overdue.
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        if let Some(due) = self.due_date {
            due < now && self.status != TaskStatus::Completed
        } else {
            false
        }
    }
}

impl SubTask {
    pub fn new(user_id: Uuid, task_id: i64, subtask_id: i64, title: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            task_id,
            subtask_id,
            title,
            completed: false,
            created_at: Utc::now(),
        }
    }
}

/// Completed/total counts over a task's subtasks.
pub fn subtask_progress(subtasks: &[SubTask]) -> (usize, usize) {
    let total = subtasks.len();
    let completed = subtasks.iter().filter(|s| s.completed).count();
    (completed, total)
}

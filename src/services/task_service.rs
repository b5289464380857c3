use anyhow::Result;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::domain::tag::Tag;
use crate::domain::task::{SubTask, Task, TaskStatus};
use crate::engine::{self, DerivedView, Snapshot, ViewParams};
use crate::repository::Repository;
use crate::services::error_handling::TwodooError;

/// Application service over the task store. Mutations go straight through to
/// the repository; reads produce a full snapshot for the derivation engine.
/// There is no in-place patching: after any mutation the caller refetches.
#[derive(Clone)]
pub struct TaskService {
    pub repository: Arc<Repository>,
}

impl TaskService {
    pub fn new(repository: Arc<Repository>) -> Self {
        Self { repository }
    }

    /// Persists a new task, assigning the next human-facing id for its
    /// owner. The caller-supplied `task_id` is ignored.
    pub async fn create(&self, mut task: Task) -> Result<Task> {
        validate_title(&task.title)?;
        task.task_id = self.repository.tasks.next_task_id(task.user_id).await?;
        self.repository.tasks.create(&task).await?;
        Ok(task)
    }

    pub async fn update(&self, task: Task) -> Result<Task> {
        validate_title(&task.title)?;
        self.repository.tasks.update(&task).await?;
        Ok(task)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Task>> {
        self.repository.tasks.get(id).await
    }

    /// Deletes the task together with its subtasks and tag joins.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        self.repository.tasks.delete(id).await
    }

    pub async fn mark_complete(&self, id: Uuid) -> Result<Task> {
        let mut task = self
            .repository
            .tasks
            .get(id)
            .await?
            .ok_or(TwodooError::TaskNotFound { id })?;
        task.update_status(TaskStatus::Completed);
        self.repository.tasks.update(&task).await?;
        Ok(task)
    }

    pub async fn add_subtask(&self, user_id: Uuid, task_id: i64, title: String) -> Result<SubTask> {
        validate_title(&title)?;
        let subtask_id = self
            .repository
            .tasks
            .next_subtask_id(user_id, task_id)
            .await?;
        let subtask = SubTask::new(user_id, task_id, subtask_id, title);
        self.repository.tasks.create_subtask(&subtask).await?;
        Ok(subtask)
    }

    pub async fn update_subtask(&self, subtask: &SubTask) -> Result<()> {
        validate_title(&subtask.title)?;
        self.repository.tasks.update_subtask(subtask).await
    }

    pub async fn delete_subtask(&self, id: Uuid) -> Result<bool> {
        self.repository.tasks.delete_subtask(id).await
    }

    pub async fn create_tag(&self, tag: Tag) -> Result<Tag> {
        if tag.name.trim().is_empty() {
            return Err(TwodooError::validation("name", "must not be empty").into());
        }
        self.repository.tags.create(&tag).await?;
        Ok(tag)
    }

    pub async fn list_tags(&self, user_id: Uuid) -> Result<Vec<Tag>> {
        self.repository.tags.list(user_id).await
    }

    pub async fn set_task_tags(&self, user_id: Uuid, task_id: i64, tag_ids: &[Uuid]) -> Result<()> {
        self.repository.tags.set_task_tags(user_id, task_id, tag_ids).await
    }

    /// One full read of a user's rows. A failed task fetch fails the whole
    /// snapshot; failed subtask/tag reads degrade to empty sets, matching
    /// how the dashboard treats those secondary queries.
    pub async fn fetch_snapshot(&self, user_id: Uuid) -> Result<Snapshot> {
        let tasks = self.repository.tasks.list(user_id).await?;
        let task_ids: Vec<i64> = tasks.iter().map(|t| t.task_id).collect();

        let subtasks = match self.repository.tasks.list_subtasks(user_id, &task_ids).await {
            Ok(subtasks) => subtasks,
            Err(e) => {
                warn!("Failed to fetch subtasks, continuing without: {}", e);
                Vec::new()
            }
        };
        let task_tags = match self.repository.tags.list_task_tags(user_id, &task_ids).await {
            Ok(joins) => joins,
            Err(e) => {
                warn!("Failed to fetch tag joins, continuing without: {}", e);
                Vec::new()
            }
        };
        let tags = match self.repository.tags.list(user_id).await {
            Ok(tags) => tags,
            Err(e) => {
                warn!("Failed to fetch tags, continuing without: {}", e);
                Vec::new()
            }
        };

        Ok(Snapshot {
            tasks,
            subtasks,
            task_tags,
            tags,
        })
    }

    /// Fetch + derive in one call. Fail-closed: if the snapshot cannot be
    /// read, the result is the deterministic empty view, never stale or
    /// partial data.
    pub async fn load_view(&self, user_id: Uuid, params: &ViewParams) -> DerivedView {
        match self.fetch_snapshot(user_id).await {
            Ok(snapshot) => engine::derive_view(&snapshot, params),
            Err(e) => {
                warn!("Snapshot fetch failed, returning empty view: {}", e);
                DerivedView::empty()
            }
        }
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(TwodooError::validation("title", "must not be empty").into());
    }
    Ok(())
}

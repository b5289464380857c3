use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::domain::tag::{Tag, TaskTag};
use crate::domain::task::{SubTask, Task};

/// The full set of one user's rows as of one fetch. Produced by the store,
/// consumed read-only by the pipeline; mutations never patch a snapshot,
/// callers refetch instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub subtasks: Vec<SubTask>,
    pub task_tags: Vec<TaskTag>,
    pub tags: Vec<Tag>,
}

/// A task with its subtasks and tags attached, plus derived state. This is
/// what every later stage and the presentation layer work with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskView {
    pub task: Task,
    pub subtasks: Vec<SubTask>,
    pub tags: Vec<Tag>,
    /// Set by the classify stage; false until then.
    pub is_overdue: bool,
}

/// Joins subtask and tag rows onto their tasks by `task_id`. Both groupings
/// are built as maps once, not scanned per task. Orphan rows (subtask with
/// no parent, join row with no resolvable tag) are dropped, not fatal.
pub fn normalize(snapshot: &Snapshot) -> Vec<TaskView> {
    let known: std::collections::HashSet<i64> =
        snapshot.tasks.iter().map(|t| t.task_id).collect();

    let mut subtasks_by_task: HashMap<i64, Vec<SubTask>> = HashMap::new();
    for subtask in &snapshot.subtasks {
        if !known.contains(&subtask.task_id) {
            debug!(
                subtask_id = subtask.subtask_id,
                task_id = subtask.task_id,
                "dropping subtask with no parent task"
            );
            continue;
        }
        subtasks_by_task
            .entry(subtask.task_id)
            .or_default()
            .push(subtask.clone());
    }

    let tags_by_id: HashMap<Uuid, &Tag> = snapshot.tags.iter().map(|t| (t.id, t)).collect();
    let mut tags_by_task: HashMap<i64, Vec<Tag>> = HashMap::new();
    for join in &snapshot.task_tags {
        let Some(tag) = tags_by_id.get(&join.tag_id) else {
            debug!(
                task_id = join.task_id,
                tag_id = %join.tag_id,
                "dropping tag join with no matching tag"
            );
            continue;
        };
        if !known.contains(&join.task_id) {
            debug!(
                task_id = join.task_id,
                tag_id = %join.tag_id,
                "dropping tag join with no parent task"
            );
            continue;
        }
        tags_by_task
            .entry(join.task_id)
            .or_default()
            .push((*tag).clone());
    }

    snapshot
        .tasks
        .iter()
        .map(|task| TaskView {
            subtasks: subtasks_by_task.remove(&task.task_id).unwrap_or_default(),
            tags: tags_by_task.remove(&task.task_id).unwrap_or_default(),
            task: task.clone(),
            is_overdue: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::Task;
    use chrono::Utc;

    fn snapshot_with(user: Uuid) -> Snapshot {
        let task_a = Task::new(user, 1, "A".to_string());
        let task_b = Task::new(user, 2, "B".to_string());
        let tag = Tag::new(user, "home".to_string(), None);
        Snapshot {
            subtasks: vec![
                SubTask::new(user, 1, 1, "first".to_string()),
                SubTask::new(user, 1, 2, "second".to_string()),
            ],
            task_tags: vec![TaskTag {
                user_id: user,
                task_id: 2,
                tag_id: tag.id,
            }],
            tags: vec![tag],
            tasks: vec![task_a, task_b],
        }
    }

    #[test]
    fn test_attaches_subtasks_and_tags_by_task_id() {
        let user = Uuid::new_v4();
        let views = normalize(&snapshot_with(user));

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].task.task_id, 1);
        assert_eq!(views[0].subtasks.len(), 2);
        assert!(views[0].tags.is_empty());

        assert_eq!(views[1].task.task_id, 2);
        assert!(views[1].subtasks.is_empty());
        assert_eq!(views[1].tags.len(), 1);
        assert_eq!(views[1].tags[0].name, "home");
    }

    #[test]
    fn test_drops_orphan_subtask() {
        let user = Uuid::new_v4();
        let mut snapshot = snapshot_with(user);
        snapshot
            .subtasks
            .push(SubTask::new(user, 99, 1, "orphan".to_string()));

        let views = normalize(&snapshot);
        let total: usize = views.iter().map(|v| v.subtasks.len()).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_drops_unresolvable_tag_join() {
        let user = Uuid::new_v4();
        let mut snapshot = snapshot_with(user);
        snapshot.task_tags.push(TaskTag {
            user_id: user,
            task_id: 1,
            tag_id: Uuid::new_v4(),
        });

        let views = normalize(&snapshot);
        assert!(views[0].tags.is_empty());
        assert_eq!(views[1].tags.len(), 1);
    }

    #[test]
    fn test_preserves_store_order() {
        let user = Uuid::new_v4();
        let mut snapshot = snapshot_with(user);
        snapshot.tasks.reverse();
        snapshot.tasks[0].created_at = Utc::now();

        let views = normalize(&snapshot);
        assert_eq!(views[0].task.task_id, 2);
        assert_eq!(views[1].task.task_id, 1);
    }
}

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::task::{Priority, SubTask, Task, TaskStatus};

#[derive(Clone)]
pub struct TaskRepository {
    pool: Arc<SqlitePool>,
}

impl TaskRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, task: &Task) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tasks (
                id, user_id, task_id, title, description, status, priority,
                due_date, completed_at, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(task.id.to_string())
        .bind(task.user_id.to_string())
        .bind(task.task_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(status_to_string(&task.status))
        .bind(task.priority.map(|p| priority_to_string(&p)))
        .bind(task.due_date.map(|d| d.to_rfc3339()))
        .bind(task.completed_at.map(|d| d.to_rfc3339()))
        .bind(task.created_at.to_rfc3339())
        .bind(task.updated_at.to_rfc3339())
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    pub async fn update(&self, task: &Task) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE tasks SET
                title = ?, description = ?, status = ?, priority = ?,
                due_date = ?, completed_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(status_to_string(&task.status))
        .bind(task.priority.map(|p| priority_to_string(&p)))
        .bind(task.due_date.map(|d| d.to_rfc3339()))
        .bind(task.completed_at.map(|d| d.to_rfc3339()))
        .bind(task.updated_at.to_rfc3339())
        .bind(task.id.to_string())
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Task>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, task_id, title, description, status, priority,
                   due_date, completed_at, created_at, updated_at
            FROM tasks WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(row_to_task).transpose()
    }

    /// Deletes the task and everything owned through its human-facing id:
    /// subtasks and tag joins go in the same transaction.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let owner: Option<(String, i64)> =
            sqlx::query_as("SELECT user_id, task_id FROM tasks WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&mut *tx)
                .await?;

        let Some((user_id, task_id)) = owner else {
            return Ok(false);
        };

        sqlx::query("DELETE FROM task_tags WHERE user_id = ? AND task_id = ?")
            .bind(&user_id)
            .bind(task_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM subtasks WHERE user_id = ? AND task_id = ?")
            .bind(&user_id)
            .bind(task_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// All of one user's tasks, unfiltered, in human-id order. This is the
    /// store order the derivation pipeline treats as the stable baseline.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Task>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, task_id, title, description, status, priority,
                   due_date, completed_at, created_at, updated_at
            FROM tasks WHERE user_id = ?
            ORDER BY task_id ASC
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(row_to_task).collect()
    }

    pub async fn next_task_id(&self, user_id: Uuid) -> Result<i64> {
        let max: Option<i64> =
            sqlx::query_scalar("SELECT MAX(task_id) FROM tasks WHERE user_id = ?")
                .bind(user_id.to_string())
                .fetch_one(self.pool.as_ref())
                .await?;
        Ok(max.unwrap_or(0) + 1)
    }

    pub async fn list_subtasks(&self, user_id: Uuid, task_ids: &[i64]) -> Result<Vec<SubTask>> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }

        let id_list = task_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            r#"
            SELECT id, user_id, task_id, subtask_id, title, completed, created_at
            FROM subtasks
            WHERE user_id = ? AND task_id IN ({id_list})
            ORDER BY task_id ASC, subtask_id ASC
            "#,
        );

        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .fetch_all(self.pool.as_ref())
            .await?;

        rows.into_iter().map(row_to_subtask).collect()
    }

    pub async fn create_subtask(&self, subtask: &SubTask) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO subtasks (id, user_id, task_id, subtask_id, title, completed, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(subtask.id.to_string())
        .bind(subtask.user_id.to_string())
        .bind(subtask.task_id)
        .bind(subtask.subtask_id)
        .bind(&subtask.title)
        .bind(subtask.completed as i32)
        .bind(subtask.created_at.to_rfc3339())
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    pub async fn update_subtask(&self, subtask: &SubTask) -> Result<()> {
        sqlx::query("UPDATE subtasks SET title = ?, completed = ? WHERE id = ?")
            .bind(&subtask.title)
            .bind(subtask.completed as i32)
            .bind(subtask.id.to_string())
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    pub async fn delete_subtask(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM subtasks WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool.as_ref())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn next_subtask_id(&self, user_id: Uuid, task_id: i64) -> Result<i64> {
        let max: Option<i64> = sqlx::query_scalar(
            "SELECT MAX(subtask_id) FROM subtasks WHERE user_id = ? AND task_id = ?",
        )
        .bind(user_id.to_string())
        .bind(task_id)
        .fetch_one(self.pool.as_ref())
        .await?;
        Ok(max.unwrap_or(0) + 1)
    }
}

fn row_to_task(row: sqlx::sqlite::SqliteRow) -> Result<Task> {
    Ok(Task {
        id: Uuid::parse_str(row.get("id"))?,
        user_id: Uuid::parse_str(row.get("user_id"))?,
        task_id: row.get("task_id"),
        title: row.get("title"),
        description: row.get("description"),
        status: string_to_status(row.get("status"))?,
        // Unrecognized priorities rank as "unknown" downstream instead of
        // failing the row.
        priority: row
            .get::<Option<String>, _>("priority")
            .and_then(|s| string_to_priority(&s)),
        due_date: row
            .get::<Option<String>, _>("due_date")
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
        completed_at: row
            .get::<Option<String>, _>("completed_at")
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)),
        created_at: DateTime::parse_from_rfc3339(row.get("created_at"))?.with_timezone(&Utc),
        updated_at: DateTime::parse_from_rfc3339(row.get("updated_at"))?.with_timezone(&Utc),
    })
}

fn row_to_subtask(row: sqlx::sqlite::SqliteRow) -> Result<SubTask> {
    Ok(SubTask {
        id: Uuid::parse_str(row.get("id"))?,
        user_id: Uuid::parse_str(row.get("user_id"))?,
        task_id: row.get("task_id"),
        subtask_id: row.get("subtask_id"),
        title: row.get("title"),
        completed: row.get::<i32, _>("completed") != 0,
        created_at: DateTime::parse_from_rfc3339(row.get("created_at"))?.with_timezone(&Utc),
    })
}

fn status_to_string(status: &TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "todo",
        TaskStatus::InProgress => "in-progress",
        TaskStatus::Completed => "completed",
    }
}

fn string_to_status(s: &str) -> Result<TaskStatus> {
    match s {
        "todo" => Ok(TaskStatus::Todo),
        "in-progress" => Ok(TaskStatus::InProgress),
        "completed" => Ok(TaskStatus::Completed),
        _ => Err(anyhow::anyhow!("Invalid task status: {}", s)),
    }
}

fn priority_to_string(priority: &Priority) -> &'static str {
    match priority {
        Priority::High => "high",
        Priority::Medium => "medium",
        Priority::Low => "low",
    }
}

fn string_to_priority(s: &str) -> Option<Priority> {
    match s {
        "high" => Some(Priority::High),
        "medium" => Some(Priority::Medium),
        "low" => Some(Priority::Low),
        _ => None,
    }
}

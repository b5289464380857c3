use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::tag::{Tag, TaskTag};

#[derive(Clone)]
pub struct TagRepository {
    pool: Arc<SqlitePool>,
}

impl TagRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, tag: &Tag) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tags (id, user_id, name, color, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(tag.id.to_string())
        .bind(tag.user_id.to_string())
        .bind(&tag.name)
        .bind(&tag.color)
        .bind(tag.created_at.to_rfc3339())
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM task_tags WHERE tag_id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, name, color, created_at
            FROM tags WHERE user_id = ?
            ORDER BY name ASC
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(row_to_tag).collect()
    }

    pub async fn list_task_tags(&self, user_id: Uuid, task_ids: &[i64]) -> Result<Vec<TaskTag>> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }

        let id_list = task_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "SELECT user_id, task_id, tag_id FROM task_tags WHERE user_id = ? AND task_id IN ({id_list})",
        );

        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .fetch_all(self.pool.as_ref())
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(TaskTag {
                    user_id: Uuid::parse_str(row.get("user_id"))?,
                    task_id: row.get("task_id"),
                    tag_id: Uuid::parse_str(row.get("tag_id"))?,
                })
            })
            .collect()
    }

    /// Replaces a task's tag set wholesale: the form submits the full
    /// selection, not a diff.
    pub async fn set_task_tags(&self, user_id: Uuid, task_id: i64, tag_ids: &[Uuid]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM task_tags WHERE user_id = ? AND task_id = ?")
            .bind(user_id.to_string())
            .bind(task_id)
            .execute(&mut *tx)
            .await?;

        for tag_id in tag_ids {
            sqlx::query("INSERT INTO task_tags (user_id, task_id, tag_id) VALUES (?, ?, ?)")
                .bind(user_id.to_string())
                .bind(task_id)
                .bind(tag_id.to_string())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

fn row_to_tag(row: sqlx::sqlite::SqliteRow) -> Result<Tag> {
    Ok(Tag {
        id: Uuid::parse_str(row.get("id"))?,
        user_id: Uuid::parse_str(row.get("user_id"))?,
        name: row.get("name"),
        color: row.get("color"),
        created_at: DateTime::parse_from_rfc3339(row.get("created_at"))?.with_timezone(&Utc),
    })
}

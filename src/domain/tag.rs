use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-defined label, shared across tasks by reference. Membership is
/// recorded in task_tags join rows, never embedded in task storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One task↔tag join row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskTag {
    pub user_id: Uuid,
    pub task_id: i64,
    pub tag_id: Uuid,
}

impl Tag {
    pub fn new(user_id: Uuid, name: String, color: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            color,
            created_at: Utc::now(),
        }
    }
}

pub mod database;
pub mod tag_repository;
pub mod task_repository;

use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct Repository {
    pub pool: Arc<SqlitePool>,
    pub tasks: task_repository::TaskRepository,
    pub tags: tag_repository::TagRepository,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        let pool = Arc::new(pool);
        Self {
            tasks: task_repository::TaskRepository::new(pool.clone()),
            tags: tag_repository::TagRepository::new(pool.clone()),
            pool,
        }
    }
}

use crate::domain::{models::group_lock::LockOutcome, ports::GroupLockRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

pub struct SqliteGroupLockRepo {
    pool: SqlitePool,
}

impl SqliteGroupLockRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl GroupLockRepository for SqliteGroupLockRepo {
    async fn try_lock(&self, group_id: &str) -> Result<LockOutcome, AppError> {
        let result = sqlx::query("INSERT INTO group_locks (group_id, created_at) VALUES (?, ?) ON CONFLICT(group_id) DO NOTHING")
            .bind(group_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            Ok(LockOutcome::AlreadyLocked)
        } else {
            Ok(LockOutcome::Acquired)
        }
    }

    async fn is_locked(&self, group_id: &str) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM group_locks WHERE group_id = ?")
            .bind(group_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(count > 0)
    }

    async fn release(&self, group_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM group_locks WHERE group_id = ?")
            .bind(group_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }
}

use crate::domain::{models::guest::Guest, ports::GuestRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresGuestRepo {
    pool: PgPool,
}

impl PostgresGuestRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GuestRepository for PostgresGuestRepo {
    async fn find_by_name(&self, first_name: &str, last_name: &str) -> Result<Option<Guest>, AppError> {
        // Prefer a row that actually carries a group.
        sqlx::query_as::<_, Guest>(
            "SELECT id, first_name, last_name, group_id, created_at FROM guests
             WHERE lower(first_name) = lower($1) AND lower(last_name) = lower($2)
             ORDER BY group_id IS NULL, created_at ASC
             LIMIT 1",
        )
            .bind(first_name)
            .bind(last_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_group(&self, group_id: &str) -> Result<Vec<Guest>, AppError> {
        sqlx::query_as::<_, Guest>(
            "SELECT id, first_name, last_name, group_id, created_at FROM guests
             WHERE group_id = $1
             ORDER BY lower(last_name) ASC, lower(first_name) ASC",
        )
            .bind(group_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}

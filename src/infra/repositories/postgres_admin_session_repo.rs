use crate::domain::{models::auth::AdminSessionRecord, ports::AdminSessionRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

pub struct PostgresAdminSessionRepo {
    pool: PgPool,
}

impl PostgresAdminSessionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminSessionRepository for PostgresAdminSessionRepo {
    async fn create(&self, session: &AdminSessionRecord) -> Result<(), AppError> {
        sqlx::query("INSERT INTO admin_sessions (id, admin_id, expires_at, created_at) VALUES ($1, $2, $3, $4)")
            .bind(&session.id)
            .bind(&session.admin_id)
            .bind(session.expires_at)
            .bind(session.created_at)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn find_active(&self, id: &str) -> Result<Option<AdminSessionRecord>, AppError> {
        sqlx::query_as::<_, AdminSessionRecord>("SELECT * FROM admin_sessions WHERE id = $1 AND expires_at > $2")
            .bind(id)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn revoke(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM admin_sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all_for(&self, admin_id: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM admin_sessions WHERE admin_id = $1")
            .bind(admin_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn purge_expired(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM admin_sessions WHERE expires_at <= $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }
}

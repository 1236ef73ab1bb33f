use crate::domain::{models::rsvp::Rsvp, ports::{RsvpRepository, SavedSubmission}};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

pub struct PostgresRsvpRepo {
    pool: PgPool,
}

impl PostgresRsvpRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// The submitter's own row: a resubmission by the same person and group keeps the id and
/// takes the latest answer and contact details.
const DETAIL_UPSERT: &str = "INSERT INTO rsvps (id, first_name, last_name, group_id, attending, guests, email, phone, diet, message, created_at)
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
     ON CONFLICT(lower(first_name), lower(last_name), group_id) DO UPDATE SET
     attending = excluded.attending,
     guests = excluded.guests,
     email = excluded.email,
     phone = excluded.phone,
     diet = excluded.diet,
     message = excluded.message
     RETURNING *";

/// Party rows: only attendance and headcount change, contact details stay.
const MEMBER_UPSERT: &str = "INSERT INTO rsvps (id, first_name, last_name, group_id, attending, guests, email, phone, diet, message, created_at)
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
     ON CONFLICT(lower(first_name), lower(last_name), group_id) DO UPDATE SET
     attending = excluded.attending,
     guests = excluded.guests
     RETURNING *";

async fn upsert_members(conn: &mut PgConnection, rows: &[Rsvp]) -> Result<Vec<Rsvp>, AppError> {
    let mut saved = Vec::with_capacity(rows.len());
    for row in rows {
        let stored = sqlx::query_as::<_, Rsvp>(MEMBER_UPSERT)
            .bind(&row.id).bind(&row.first_name).bind(&row.last_name).bind(&row.group_id)
            .bind(row.attending).bind(row.guests).bind(&row.email).bind(&row.phone)
            .bind(&row.diet).bind(&row.message).bind(row.created_at)
            .fetch_one(&mut *conn).await.map_err(AppError::Database)?;
        saved.push(stored);
    }
    Ok(saved)
}

#[async_trait]
impl RsvpRepository for PostgresRsvpRepo {
    async fn list_by_group(&self, group_id: &str) -> Result<Vec<Rsvp>, AppError> {
        sqlx::query_as::<_, Rsvp>("SELECT * FROM rsvps WHERE group_id = $1 ORDER BY last_name ASC, first_name ASC")
            .bind(group_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn save_submission(&self, detail: &Rsvp, party: &[Rsvp]) -> Result<SavedSubmission, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let stored = sqlx::query_as::<_, Rsvp>(DETAIL_UPSERT)
            .bind(&detail.id).bind(&detail.first_name).bind(&detail.last_name).bind(&detail.group_id)
            .bind(detail.attending).bind(detail.guests).bind(&detail.email).bind(&detail.phone)
            .bind(&detail.diet).bind(&detail.message).bind(detail.created_at)
            .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        let duplicate = stored.id != detail.id;

        let party = upsert_members(&mut *tx, party).await?;
        tx.commit().await.map_err(AppError::Database)?;

        let record = party.iter().find(|r| r.id == stored.id).cloned().unwrap_or(stored);
        Ok(SavedSubmission { record, duplicate, party })
    }

    async fn upsert_party(&self, rows: &[Rsvp]) -> Result<Vec<Rsvp>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let saved = upsert_members(&mut *tx, rows).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(saved)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Rsvp>, AppError> {
        sqlx::query_as::<_, Rsvp>("SELECT * FROM rsvps WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_all(&self) -> Result<Vec<Rsvp>, AppError> {
        sqlx::query_as::<_, Rsvp>("SELECT * FROM rsvps ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update_attending(&self, id: &str, attending: bool) -> Result<Rsvp, AppError> {
        sqlx::query_as::<_, Rsvp>("UPDATE rsvps SET attending = $1 WHERE id = $2 RETURNING *")
            .bind(attending)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("RSVP not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM rsvps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("RSVP not found".into()));
        }
        Ok(())
    }
}

use super::models::Session;
use crate::error::StashError;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

#[derive(Debug, Clone)]
pub struct AuthDatabase {
    pool: SqlitePool,
}

impl AuthDatabase {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert_session(
        &self,
        session_id: uuid::Uuid,
        expires: DateTime<Utc>,
    ) -> Result<Session, StashError> {
        sqlx::query_as::<_, Session>(
            "INSERT INTO sessions(id, expires) VALUES (?, ?) RETURNING *",
        )
        .bind(session_id)
        .bind(expires)
        .fetch_one(&self.pool)
        .await
        .map_err(StashError::from)
    }

    pub async fn session_check(&self, session_id: uuid::Uuid) -> Result<bool, StashError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(id) FROM sessions WHERE id = ? AND expires > ?",
        )
        .bind(session_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(count == 1)
    }
}

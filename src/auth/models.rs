use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Session model
#[derive(Debug, FromRow)]
pub struct Session {
    pub id: uuid::Uuid,
    pub expires: DateTime<Utc>,
}

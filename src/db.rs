use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::error::StashError;

pub async fn create_pool(url: &str) -> Result<SqlitePool, StashError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await?;

    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), StashError> {
    sqlx::migrate!().run(pool).await?;
    info!("Migrations up to date");
    Ok(())
}

#[cfg(test)]
pub mod test {
    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

    /// An isolated in-memory database with the full schema applied.
    /// Single connection so the memory database survives the pool.
    pub async fn memory_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");

        sqlx::migrate!().run(&pool).await.expect("migrations");

        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .expect("pragma");

        pool
    }
}

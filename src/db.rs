//! Database connection management and migrations.

use anyhow::Context as _;
use sqlx::SqlitePool;

pub struct Db {
    pub pool: SqlitePool,
}

impl Db {
    /// Open (creating if needed) the SQLite database and run migrations.
    pub async fn connect(database: &str) -> crate::Result<Self> {
        let url = format!("sqlite:{database}?mode=rwc");
        let pool = SqlitePool::connect(&url)
            .await
            .with_context(|| format!("failed to connect to SQLite at {database}"))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run database migrations")?;

        Ok(Self { pool })
    }

    /// Close the connection pool gracefully.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

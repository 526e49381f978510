//! SeenStore: persistence for per-nick activity records.

use crate::seen::types::SeenRecord;

use anyhow::Context as _;
use chrono::Utc;
use sqlx::SqlitePool;

/// Persistent store for seen records, one row per nick.
#[derive(Clone)]
pub struct SeenStore {
    pool: SqlitePool,
}

impl SeenStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, who: &str) -> crate::Result<Option<SeenRecord>> {
        let row = sqlx::query_as::<_, SeenRow>(
            "SELECT who, last_seen_at, last_message FROM seen WHERE who = ?",
        )
        .bind(who)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch seen record")?;

        Ok(row.map(SeenRow::into_record))
    }

    pub async fn insert(&self, record: &SeenRecord) -> crate::Result<()> {
        sqlx::query("INSERT INTO seen (who, last_seen_at, last_message) VALUES (?, ?, ?)")
            .bind(&record.who)
            .bind(record.last_seen_at)
            .bind(&record.last_message)
            .execute(&self.pool)
            .await
            .context("failed to insert seen record")?;

        Ok(())
    }

    /// Overwrite timestamp and message for an existing nick.
    pub async fn update(&self, record: &SeenRecord) -> crate::Result<()> {
        sqlx::query("UPDATE seen SET last_seen_at = ?, last_message = ? WHERE who = ?")
            .bind(record.last_seen_at)
            .bind(&record.last_message)
            .bind(&record.who)
            .execute(&self.pool)
            .await
            .context("failed to update seen record")?;

        Ok(())
    }
}

/// Internal row type for sqlx deserialization.
#[derive(sqlx::FromRow)]
struct SeenRow {
    who: String,
    last_seen_at: chrono::DateTime<Utc>,
    last_message: String,
}

impl SeenRow {
    fn into_record(self) -> SeenRecord {
        SeenRecord {
            who: self.who,
            last_seen_at: self.last_seen_at,
            last_message: self.last_message,
        }
    }
}

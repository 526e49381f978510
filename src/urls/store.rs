//! UrlStore: persistence for cached URL titles.

use crate::urls::types::UrlRecord;

use anyhow::Context as _;
use chrono::Utc;
use sqlx::SqlitePool;

/// Persistent store for URL title records, one row per exact URL string.
#[derive(Clone)]
pub struct UrlStore {
    pool: SqlitePool,
}

impl UrlStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Look up the record for a URL, exact string match.
    pub async fn get(&self, url: &str) -> crate::Result<Option<UrlRecord>> {
        let row = sqlx::query_as::<_, UrlRow>(
            "SELECT url, title, who, posted_at FROM urls WHERE url = ?",
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch url record")?;

        Ok(row.map(UrlRow::into_record))
    }

    /// Insert a record for a URL with no prior row. When two cold dispatches
    /// of the same URL race, the loser overwrites instead of failing on the
    /// primary key: last writer wins.
    pub async fn insert(&self, record: &UrlRecord) -> crate::Result<()> {
        sqlx::query(
            "INSERT INTO urls (url, title, who, posted_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(url)
             DO UPDATE SET title = excluded.title,
                           who = excluded.who,
                           posted_at = excluded.posted_at",
        )
        .bind(&record.url)
        .bind(&record.title)
        .bind(&record.who)
        .bind(record.posted_at)
        .execute(&self.pool)
        .await
        .context("failed to insert url record")?;

        Ok(())
    }

    /// Overwrite title, author, and timestamp for an existing URL.
    pub async fn update(&self, record: &UrlRecord) -> crate::Result<()> {
        sqlx::query("UPDATE urls SET title = ?, who = ?, posted_at = ? WHERE url = ?")
            .bind(&record.title)
            .bind(&record.who)
            .bind(record.posted_at)
            .bind(&record.url)
            .execute(&self.pool)
            .await
            .context("failed to update url record")?;

        Ok(())
    }
}

/// Internal row type for sqlx deserialization.
#[derive(sqlx::FromRow)]
struct UrlRow {
    url: String,
    title: String,
    who: String,
    posted_at: chrono::DateTime<Utc>,
}

impl UrlRow {
    fn into_record(self) -> UrlRecord {
        UrlRecord {
            url: self.url,
            title: self.title,
            who: self.who,
            posted_at: self.posted_at,
        }
    }
}

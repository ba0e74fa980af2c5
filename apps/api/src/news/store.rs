//! News Store: the daily news cache behind a trait.
//!
//! `PgNewsStore` persists to the `daily_news` table. `MemoryNewsStore` keeps the
//! same data in process and is used when no `DATABASE_URL` is configured.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::news::{DailyNewsRow, NewsItem};

#[async_trait]
pub trait NewsStore: Send + Sync {
    async fn has_news_for(&self, date: NaiveDate) -> Result<bool, AppError>;

    /// Items of the most recent stored day, if any day is stored.
    async fn latest(&self) -> Result<Option<(NaiveDate, Vec<NewsItem>)>, AppError>;

    /// Removes every day strictly before `date`. Returns the number of items removed.
    async fn delete_before(&self, date: NaiveDate) -> Result<u64, AppError>;

    /// Stores `items` under `date`, assigning fresh ids. Returns the number stored.
    async fn insert(&self, date: NaiveDate, items: &[NewsItem]) -> Result<usize, AppError>;

    /// "postgres" | "memory", for logs.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// Postgres
// ────────────────────────────────────────────────────────────────────────────

pub struct PgNewsStore {
    pool: PgPool,
}

impl PgNewsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NewsStore for PgNewsStore {
    async fn has_news_for(&self, date: NaiveDate) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM daily_news WHERE news_date = $1)")
                .bind(date)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn latest(&self) -> Result<Option<(NaiveDate, Vec<NewsItem>)>, AppError> {
        let latest_date: Option<NaiveDate> =
            sqlx::query_scalar("SELECT MAX(news_date) FROM daily_news")
                .fetch_one(&self.pool)
                .await?;
        let Some(date) = latest_date else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, DailyNewsRow>(
            "SELECT * FROM daily_news WHERE news_date = $1 ORDER BY publish_date DESC, created_at",
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some((date, rows.into_iter().map(NewsItem::from).collect())))
    }

    async fn delete_before(&self, date: NaiveDate) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM daily_news WHERE news_date < $1")
            .bind(date)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert(&self, date: NaiveDate, items: &[NewsItem]) -> Result<usize, AppError> {
        let mut tx = self.pool.begin().await?;
        for item in items {
            sqlx::query(
                r#"
                INSERT INTO daily_news
                    (id, news_date, title, company, industry, category,
                     amount, investors, publish_date, content, thumbnail)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(date)
            .bind(&item.title)
            .bind(&item.company)
            .bind(&item.industry)
            .bind(&item.category)
            .bind(&item.amount)
            .bind(&item.investors)
            .bind(&item.publish_date)
            .bind(&item.content)
            .bind(&item.thumbnail)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(items.len())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryNewsStore {
    days: RwLock<BTreeMap<NaiveDate, Vec<NewsItem>>>,
}

impl MemoryNewsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NewsStore for MemoryNewsStore {
    async fn has_news_for(&self, date: NaiveDate) -> Result<bool, AppError> {
        Ok(self
            .days
            .read()
            .await
            .get(&date)
            .is_some_and(|items| !items.is_empty()))
    }

    async fn latest(&self) -> Result<Option<(NaiveDate, Vec<NewsItem>)>, AppError> {
        Ok(self
            .days
            .read()
            .await
            .iter()
            .rev()
            .find(|(_, items)| !items.is_empty())
            .map(|(date, items)| (*date, items.clone())))
    }

    async fn delete_before(&self, date: NaiveDate) -> Result<u64, AppError> {
        let mut days = self.days.write().await;
        let kept = days.split_off(&date);
        let removed = days.values().map(|items| items.len() as u64).sum();
        *days = kept;
        Ok(removed)
    }

    async fn insert(&self, date: NaiveDate, items: &[NewsItem]) -> Result<usize, AppError> {
        let stored = items.iter().cloned().map(|mut item| {
            item.id = Uuid::new_v4().to_string();
            item
        });
        self.days
            .write()
            .await
            .entry(date)
            .or_default()
            .extend(stored);
        Ok(items.len())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

//! Daily refresh and read path for the news panel.
//!
//! Refresh: already stored today → no-op; fetch → nothing fetched is an error;
//!          prune days older than the retention window → insert.
//! Read: the most recent stored day, else the static list dated today.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::LlmError;
use crate::models::news::NewsItem;
use crate::news::fallback::fallback_news;
use crate::news::fetcher::NewsFetcher;
use crate::news::store::NewsStore;

pub const ALREADY_FETCHED: &str = "News already exists for today";

#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub count: usize,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedOrigin {
    Stored,
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsFeed {
    pub date: NaiveDate,
    pub origin: FeedOrigin,
    pub news: Vec<NewsItem>,
}

pub async fn refresh_daily_news(
    store: &dyn NewsStore,
    fetcher: &NewsFetcher,
    today: NaiveDate,
    retention_days: i64,
) -> Result<RefreshOutcome, AppError> {
    if store.has_news_for(today).await? {
        info!("News already fetched for {today}");
        return Ok(RefreshOutcome {
            success: true,
            message: Some(ALREADY_FETCHED.to_string()),
            count: 0,
            date: today,
        });
    }

    if !fetcher.is_configured() {
        return Err(LlmError::NotConfigured("TUZI").into());
    }

    let news = fetcher.fetch_news_from_llm(today).await;
    info!("Total news fetched: {}", news.len());
    if news.is_empty() {
        return Err(AppError::Llm("No news fetched from AI".to_string()));
    }

    let cutoff = today - Duration::days(retention_days);
    match store.delete_before(cutoff).await {
        Ok(removed) => info!("Pruned {removed} news items older than {cutoff}"),
        Err(e) => warn!("Failed to prune news older than {cutoff}: {e}"),
    }

    let count = store.insert(today, &news).await?;
    info!(
        "Inserted {count} news items for {today} ({})",
        store.backend()
    );

    Ok(RefreshOutcome {
        success: true,
        message: None,
        count,
        date: today,
    })
}

pub async fn latest_news(store: &dyn NewsStore, today: NaiveDate) -> NewsFeed {
    match store.latest().await {
        Ok(Some((date, news))) => NewsFeed {
            date,
            origin: FeedOrigin::Stored,
            news,
        },
        Ok(None) => NewsFeed {
            date: today,
            origin: FeedOrigin::Fallback,
            news: fallback_news(today),
        },
        Err(e) => {
            warn!("News store unavailable, serving fallback news: {e}");
            NewsFeed {
                date: today,
                origin: FeedOrigin::Fallback,
                news: fallback_news(today),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{LlmClient, Provider};
    use crate::news::store::MemoryNewsStore;
    use async_trait::async_trait;
    use serde_json::json;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn item(title: &str) -> NewsItem {
        NewsItem {
            id: String::new(),
            title: title.to_string(),
            company: "c".to_string(),
            industry: "i".to_string(),
            category: "tech".to_string(),
            amount: String::new(),
            investors: String::new(),
            publish_date: "2026-10-13".to_string(),
            content: "x".to_string(),
            thumbnail: None,
        }
    }

    fn offline_fetcher() -> NewsFetcher {
        NewsFetcher::new(LlmClient::new(Provider::Tuzi, None))
    }

    struct BrokenStore;

    #[async_trait]
    impl NewsStore for BrokenStore {
        async fn has_news_for(&self, _: NaiveDate) -> Result<bool, AppError> {
            Err(AppError::Llm("down".to_string()))
        }
        async fn latest(&self) -> Result<Option<(NaiveDate, Vec<NewsItem>)>, AppError> {
            Err(AppError::Llm("down".to_string()))
        }
        async fn delete_before(&self, _: NaiveDate) -> Result<u64, AppError> {
            Err(AppError::Llm("down".to_string()))
        }
        async fn insert(&self, _: NaiveDate, _: &[NewsItem]) -> Result<usize, AppError> {
            Err(AppError::Llm("down".to_string()))
        }
        fn backend(&self) -> &'static str {
            "broken"
        }
    }

    #[tokio::test]
    async fn test_refresh_is_noop_when_today_exists() {
        let store = MemoryNewsStore::new();
        store.insert(day(14), &[item("a")]).await.unwrap();

        let outcome = refresh_daily_news(&store, &offline_fetcher(), day(14), 3)
            .await
            .unwrap();
        assert_eq!(outcome.message.as_deref(), Some(ALREADY_FETCHED));
        assert_eq!(outcome.count, 0);
    }

    #[tokio::test]
    async fn test_refresh_without_key_is_an_error() {
        let store = MemoryNewsStore::new();
        let result = refresh_daily_news(&store, &offline_fetcher(), day(14), 3).await;
        assert!(matches!(result, Err(AppError::Llm(_))));
    }

    #[tokio::test]
    async fn test_refresh_prunes_and_inserts() {
        let mut server = mockito::Server::new_async().await;
        let args = json!({"news": [
            {"title": "A", "company": "c", "industry": "医疗", "category": "", "content": "x"},
            {"title": "B", "company": "c", "industry": "AI", "category": "tech", "content": "y",
             "thumbnail": "https://example.com/t.png"}
        ]})
        .to_string();
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(
                json!({"choices": [{"message": {"tool_calls": [{"function": {"arguments": args}}]}}]})
                    .to_string(),
            )
            .create_async()
            .await;
        let fetcher = NewsFetcher::new(
            LlmClient::new(Provider::Tuzi, Some("k".to_string())).with_base_url(server.url()),
        )
        .with_batch_pause(std::time::Duration::ZERO);

        let store = MemoryNewsStore::new();
        store.insert(day(10), &[item("stale")]).await.unwrap();
        store.insert(day(11), &[item("kept")]).await.unwrap();

        let outcome = refresh_daily_news(&store, &fetcher, day(14), 3).await.unwrap();
        // Both batches return the same two titles.
        assert_eq!(outcome.count, 2);
        assert!(!store.has_news_for(day(10)).await.unwrap());
        assert!(store.has_news_for(day(11)).await.unwrap());

        let feed = latest_news(&store, day(14)).await;
        assert_eq!(feed.origin, FeedOrigin::Stored);
        assert_eq!(feed.date, day(14));
        assert_eq!(feed.news[0].category, "healthcare");
        assert!(feed.news.iter().all(|n| n.thumbnail.is_none()));
    }

    #[tokio::test]
    async fn test_empty_store_serves_fallback() {
        let feed = latest_news(&MemoryNewsStore::new(), day(14)).await;
        assert_eq!(feed.origin, FeedOrigin::Fallback);
        assert_eq!(feed.news.len(), 5);
    }

    #[tokio::test]
    async fn test_store_error_serves_fallback() {
        let feed = latest_news(&BrokenStore, day(14)).await;
        assert_eq!(feed.origin, FeedOrigin::Fallback);
        assert_eq!(feed.news[0].publish_date, "2026-10-14");
    }
}

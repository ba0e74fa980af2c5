//! Daily News Fetcher: asks the news model for financing news in two batches.
//!
//! A failed batch is skipped. Tool arguments that do not parse are treated as
//! truncated and every complete item is salvaged. Thumbnails are never taken
//! from the model.

use std::collections::HashSet;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::{ChatMessage, LlmClient, ToolPayload};
use crate::models::news::NewsItem;
use crate::news::prompts::{news_system_prompt, return_news_tool, BATCH_REQUESTS};
use crate::normalize::{
    array_field, extract_complete_objects, get_any, parse_lenient, string_field,
};

const BATCH_PAUSE: Duration = Duration::from_secs(1);

/// Keys an item must carry to survive truncation recovery.
pub const NEWS_REQUIRED_KEYS: [&str; 3] = ["title", "company", "content"];

pub const CATEGORIES: [&str; 5] = ["tech", "healthcare", "energy", "consumer", "enterprise"];

const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("healthcare", &["医疗", "健康", "医药", "生物", "基因", "器械"]),
    ("energy", &["能源", "电池", "储能", "光伏", "氢", "碳中和", "风电"]),
    ("consumer", &["消费", "零售", "食品", "餐饮", "品牌", "电商"]),
    ("enterprise", &["企业服务", "SaaS", "saas", "云", "协同", "B2B"]),
];

#[derive(Clone)]
pub struct NewsFetcher {
    llm: LlmClient,
    batch_pause: Duration,
}

impl NewsFetcher {
    pub fn new(llm: LlmClient) -> Self {
        Self {
            llm,
            batch_pause: BATCH_PAUSE,
        }
    }

    #[cfg(test)]
    pub fn with_batch_pause(mut self, pause: Duration) -> Self {
        self.batch_pause = pause;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.llm.is_configured()
    }

    /// All batches, de-duplicated by title. Empty when every batch failed.
    pub async fn fetch_news_from_llm(&self, today: NaiveDate) -> Vec<NewsItem> {
        let system = news_system_prompt(today);
        let mut all = Vec::new();

        for (batch, request) in BATCH_REQUESTS.iter().enumerate() {
            if batch > 0 {
                tokio::time::sleep(self.batch_pause).await;
            }

            match self.fetch_batch(&system, request, today).await {
                Ok(items) => {
                    info!("News batch {}: {} items", batch + 1, items.len());
                    all.extend(items);
                }
                Err(e) => warn!("News batch {} failed, skipping: {e}", batch + 1),
            }
        }

        dedup_by_title(all)
    }

    async fn fetch_batch(
        &self,
        system: &str,
        request: &str,
        today: NaiveDate,
    ) -> Result<Vec<NewsItem>, AppError> {
        let messages = [ChatMessage::system(system), ChatMessage::user(request)];
        let completion = self.llm.call(&messages, Some(&return_news_tool())).await?;

        let text = match &completion.payload {
            ToolPayload::Arguments(text) | ToolPayload::Content(text) => text,
            ToolPayload::Empty => {
                return Err(AppError::Llm("News batch returned no payload".to_string()))
            }
        };
        Ok(parse_news_payload(text, today))
    }
}

/// Items from a `return_news` payload, recovering complete items when the JSON was cut off.
pub fn parse_news_payload(text: &str, today: NaiveDate) -> Vec<NewsItem> {
    let records: Vec<Value> = match parse_lenient(text) {
        Ok(value) => array_field(&value, &["news", "items", "data"])
            .cloned()
            .unwrap_or_default(),
        Err(_) => {
            let recovered = extract_complete_objects(text, &NEWS_REQUIRED_KEYS);
            warn!(
                "News payload truncated, recovered {} complete items",
                recovered.len()
            );
            recovered.into_iter().map(Value::Object).collect()
        }
    };

    records
        .iter()
        .filter_map(|record| news_from_value(record, today))
        .collect()
}

/// Builds an item from a loosely-typed record. Records missing a title, company
/// or content are dropped.
pub fn news_from_value(value: &Value, today: NaiveDate) -> Option<NewsItem> {
    let title = string_field(value.get("title"));
    let company = string_field(value.get("company"));
    let content = string_field(get_any(value, &["content", "summary"]));
    if title.is_empty() || company.is_empty() || content.is_empty() {
        return None;
    }

    let industry = string_field(value.get("industry"));
    let category = normalize_category(&string_field(value.get("category")), &industry);
    let publish_date = string_field(get_any(value, &["publishDate", "publish_date", "date"]));

    Some(NewsItem {
        id: String::new(),
        title,
        company,
        industry,
        category: category.to_string(),
        amount: string_field(value.get("amount")),
        investors: string_field(value.get("investors")),
        publish_date: if publish_date.is_empty() {
            today.format("%Y-%m-%d").to_string()
        } else {
            publish_date
        },
        content,
        thumbnail: None,
    })
}

/// One of `CATEGORIES`, read from the model's category or, failing that, keywords.
pub fn normalize_category(raw: &str, industry: &str) -> &'static str {
    let lowered = raw.trim().to_lowercase();
    if let Some(known) = CATEGORIES.iter().find(|c| **c == lowered) {
        return *known;
    }

    let haystack = format!("{raw} {industry}");
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| haystack.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or("tech")
}

fn dedup_by_title(items: Vec<NewsItem>) -> Vec<NewsItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.title.trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::Provider;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    fn record(title: &str) -> Value {
        json!({
            "title": title,
            "company": "某公司",
            "industry": "人工智能",
            "category": "tech",
            "amount": "1亿元",
            "investors": "红杉中国",
            "publishDate": "2026-10-12",
            "content": "完成新一轮融资。",
            "thumbnail": "https://example.com/fake.png"
        })
    }

    fn tool_response(arguments: &str) -> String {
        json!({
            "choices": [{"message": {"tool_calls": [{"function": {"arguments": arguments}}]}}],
            "usage": {"prompt_tokens": 1, "completion_tokens": 2, "total_tokens": 3}
        })
        .to_string()
    }

    #[test]
    fn test_complete_payload_parses_and_drops_thumbnail() {
        let text = json!({"news": [record("A"), record("B")]}).to_string();
        let items = parse_news_payload(&text, today());
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.thumbnail.is_none()));
        assert_eq!(items[0].publish_date, "2026-10-12");
    }

    #[test]
    fn test_truncated_payload_recovers_complete_items() {
        let full = json!({"news": [record("A"), record("B")]}).to_string();
        // Cut in the middle of a third item.
        let truncated = format!("{}, {{\"title\": \"C\", \"compa", &full[..full.len() - 2]);
        let items = parse_news_payload(&truncated, today());
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }

    #[test]
    fn test_records_without_required_fields_dropped() {
        let text = json!({"news": [{"title": "无公司", "content": "x"}, record("A")]}).to_string();
        assert_eq!(parse_news_payload(&text, today()).len(), 1);
    }

    #[test]
    fn test_missing_publish_date_defaults_to_today() {
        let value = json!({"title": "t", "company": "c", "content": "x"});
        let item = news_from_value(&value, today()).unwrap();
        assert_eq!(item.publish_date, "2026-10-14");
        assert_eq!(item.category, "tech");
    }

    #[test]
    fn test_category_normalization() {
        assert_eq!(normalize_category("Healthcare", ""), "healthcare");
        assert_eq!(normalize_category("医疗器械", ""), "healthcare");
        assert_eq!(normalize_category("", "储能电池"), "energy");
        assert_eq!(normalize_category("融资", "企业服务"), "enterprise");
        assert_eq!(normalize_category("其他", "芯片"), "tech");
    }

    #[test]
    fn test_dedup_by_title_keeps_first() {
        let mut first = news_from_value(&record("A"), today()).unwrap();
        first.amount = "first".to_string();
        let second = news_from_value(&record(" A "), today()).unwrap();
        let items = dedup_by_title(vec![first, second]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].amount, "first");
    }

    #[tokio::test]
    async fn test_two_batches_merged_and_deduplicated() {
        let mut server = mockito::Server::new_async().await;
        let args = json!({"news": [record("A"), record("B")]}).to_string();
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(tool_response(&args))
            .expect(2)
            .create_async()
            .await;

        let llm = LlmClient::new(Provider::Tuzi, Some("k".to_string())).with_base_url(server.url());
        let fetcher = NewsFetcher::new(llm).with_batch_pause(Duration::ZERO);
        let items = fetcher.fetch_news_from_llm(today()).await;

        mock.assert_async().await;
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_batches_yield_nothing() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(400)
            .with_body(r#"{"error":{"message":"bad request"}}"#)
            .create_async()
            .await;

        let llm = LlmClient::new(Provider::Tuzi, Some("k".to_string())).with_base_url(server.url());
        let fetcher = NewsFetcher::new(llm).with_batch_pause(Duration::ZERO);
        assert!(fetcher.fetch_news_from_llm(today()).await.is_empty());
    }
}

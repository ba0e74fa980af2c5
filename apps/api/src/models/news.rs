use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One financing news item as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub company: String,
    pub industry: String,
    /// tech | healthcare | energy | consumer | enterprise
    pub category: String,
    pub amount: String,
    pub investors: String,
    /// `YYYY-MM-DD` as reported by the model.
    pub publish_date: String,
    pub content: String,
    pub thumbnail: Option<String>,
}

/// A row of the `daily_news` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyNewsRow {
    pub id: Uuid,
    /// The day the batch was fetched, not the article date.
    pub news_date: NaiveDate,
    pub title: String,
    pub company: String,
    pub industry: String,
    pub category: String,
    pub amount: String,
    pub investors: String,
    pub publish_date: String,
    pub content: String,
    pub thumbnail: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<DailyNewsRow> for NewsItem {
    fn from(row: DailyNewsRow) -> Self {
        NewsItem {
            id: row.id.to_string(),
            title: row.title,
            company: row.company,
            industry: row.industry,
            category: row.category,
            amount: row.amount,
            investors: row.investors,
            publish_date: row.publish_date,
            content: row.content,
            thumbnail: row.thumbnail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_news_item_wire_names() {
        let item = NewsItem {
            id: "n1".to_string(),
            title: "t".to_string(),
            company: "c".to_string(),
            industry: "i".to_string(),
            category: "tech".to_string(),
            amount: "1亿元".to_string(),
            investors: "红杉中国".to_string(),
            publish_date: "2026-10-10".to_string(),
            content: "x".to_string(),
            thumbnail: None,
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["publishDate"], "2026-10-10");
        assert!(value["thumbnail"].is_null());
    }

    #[test]
    fn test_row_converts_to_item() {
        let id = Uuid::new_v4();
        let row = DailyNewsRow {
            id,
            news_date: NaiveDate::from_ymd_opt(2026, 10, 14).unwrap(),
            title: "t".to_string(),
            company: "c".to_string(),
            industry: "i".to_string(),
            category: "energy".to_string(),
            amount: "a".to_string(),
            investors: "v".to_string(),
            publish_date: "2026-10-12".to_string(),
            content: "x".to_string(),
            thumbnail: None,
            created_at: Utc::now(),
        };
        let item: NewsItem = row.into();
        assert_eq!(item.id, id.to_string());
        assert_eq!(item.category, "energy");
    }
}

// Prompt builders and the tool schema for the daily news fetch.

use chrono::{Datelike, NaiveDate};
use serde_json::json;

use crate::llm_client::ToolSpec;

/// Items requested per batch.
pub const NEWS_BATCH_SIZE: usize = 10;

/// The user turn for each batch, in order.
pub const BATCH_REQUESTS: [&str; 2] = [
    "请推荐最近一周的10条投资融资新闻。",
    "请推荐另外10条不同的投资融资新闻，不要与之前的重复。",
];

/// System prompt anchored to `today` so the model does not return stale years.
pub fn news_system_prompt(today: NaiveDate) -> String {
    let date = today.format("%Y-%m-%d");
    let (year, month) = (today.year(), today.month());
    format!(
        "你是投资资讯推荐引擎，专注于中国创投市场的最新动态。

当前日期是：{date}（{year}年{month}月）

你的任务是推荐{year}年{month}月最近一周内发生的投资融资或行业重要新闻。

要求：
1. 新闻必须是{year}年{month}月发生的事件，日期必须在{date}之前的7天内
2. 新闻应来源于权威媒体（36氪、投资界、钛媒体、界面新闻、澎湃科技等）
3. 标题必须包含具体公司名称或具体行业事件
4. 内容要完整详实（60-80字），包含融资金额、投资方、公司业务简介
5. 类型可包括：融资、并购、IPO、政策、行业动态
6. 返回{NEWS_BATCH_SIZE}条不同的新闻，按发布时间从最近到最远排序

重要：所有新闻的publishDate必须是{year}年{month}月的日期，不要返回往年的旧闻！"
    )
}

pub fn return_news_tool() -> ToolSpec {
    ToolSpec {
        name: "return_news",
        description: "返回新闻列表",
        parameters: json!({
            "type": "object",
            "properties": {
                "news": {
                    "type": "array",
                    "maxItems": NEWS_BATCH_SIZE,
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "description": "新闻标题" },
                            "company": { "type": "string", "description": "公司名称" },
                            "industry": { "type": "string", "description": "行业" },
                            "category": {
                                "type": "string",
                                "description": "分类：tech/healthcare/energy/consumer/enterprise"
                            },
                            "amount": { "type": "string", "description": "融资金额" },
                            "investors": { "type": "string", "description": "投资方" },
                            "publishDate": { "type": "string", "description": "发布日期 YYYY-MM-DD" },
                            "content": { "type": "string", "description": "新闻内容，60-80字" }
                        },
                        "required": [
                            "title", "company", "industry", "category",
                            "amount", "investors", "publishDate", "content"
                        ]
                    }
                }
            },
            "required": ["news"]
        }),
    }
}

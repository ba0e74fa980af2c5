//! Axum route handlers for the News API.

use axum::{extract::State, Json};
use chrono::Utc;

use crate::errors::AppError;
use crate::news::refresh::{latest_news, refresh_daily_news, NewsFeed, RefreshOutcome};
use crate::state::AppState;

/// GET /api/v1/news
///
/// Never fails: an empty or unreachable store yields the static list.
pub async fn handle_get_news(State(state): State<AppState>) -> Json<NewsFeed> {
    let today = Utc::now().date_naive();
    Json(latest_news(state.news_store.as_ref(), today).await)
}

/// POST /api/v1/news/refresh
pub async fn handle_refresh_news(
    State(state): State<AppState>,
) -> Result<Json<RefreshOutcome>, AppError> {
    let today = Utc::now().date_naive();
    let outcome = refresh_daily_news(
        state.news_store.as_ref(),
        &state.news,
        today,
        state.config.news_retention_days,
    )
    .await?;
    Ok(Json(outcome))
}

pub mod ai_chat;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::assessment::handlers as assessment;
use crate::matching::handlers as matching;
use crate::news::handlers as news;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Matching API
        .route(
            "/api/v1/requirements/parse",
            post(matching::handle_parse_requirement),
        )
        .route("/api/v1/matches", post(matching::handle_match))
        .route("/api/v1/matches/score", post(matching::handle_score))
        .route("/api/v1/companies", get(matching::handle_list_companies))
        .route("/api/v1/companies/:id", get(matching::handle_get_company))
        .route(
            "/api/v1/companies/analysis",
            post(matching::handle_analyze_company),
        )
        // Assessment API
        .route("/api/v1/assessments", post(assessment::handle_assess))
        .route("/api/v1/assessments/render", post(assessment::handle_render))
        // Generic proxy
        .route("/api/v1/ai-chat", post(ai_chat::handle_ai_chat))
        // News API
        .route("/api/v1/news", get(news::handle_get_news))
        .route("/api/v1/news/refresh", post(news::handle_refresh_news))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = build_router(AppState::offline())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        send(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "zhaoshang-api");
    }

    #[tokio::test]
    async fn test_blank_requirement_is_400() {
        for uri in ["/api/v1/requirements/parse", "/api/v1/matches"] {
            let (status, body) = post_json(uri, json!({"requirement_text": "  "})).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn test_parse_falls_back_to_keywords_offline() {
        let (status, body) = post_json(
            "/api/v1/requirements/parse",
            json!({"requirement_text": "想在苏州引进机器人方向的B轮企业"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "heuristic");
        assert!(body["profile"]["region_preference"]
            .as_array()
            .unwrap()
            .iter()
            .any(|r| r == "苏州"));
    }

    #[tokio::test]
    async fn test_match_pipeline_offline() {
        let (status, body) = post_json(
            "/api/v1/matches",
            json!({"requirement_text": "想在苏州引进机器人方向的B轮企业"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matches"][0]["company_id"], "c002");
        assert_eq!(body["matches"][0]["source"], "heuristic");
    }

    #[tokio::test]
    async fn test_score_against_supplied_companies() {
        let (status, body) = post_json(
            "/api/v1/matches/score",
            json!({
                "profile": {"region_preference": ["杭州"]},
                "companies": [{"id": "x1", "name": "杭州某科技", "city": "杭州"}]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_matched"], 1);
        assert_eq!(body["matches"][0]["company_id"], "x1");
    }

    #[tokio::test]
    async fn test_companies_listing_and_lookup() {
        let (status, body) = get_json("/api/v1/companies").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["companies"].as_array().unwrap().len(), 12);

        let (status, body) = get_json("/api/v1/companies/c002").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "苏州灵动机器人");

        let (status, body) = get_json("/api/v1/companies/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_analysis_offline() {
        let (status, body) = post_json(
            "/api/v1/companies/analysis",
            json!({"requirement_text": "引进机器人企业", "company_id": "c002"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "heuristic");
        assert!(!body["analysis"]["matchPoints"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_analysis_requires_a_company() {
        let (status, _) = post_json(
            "/api/v1/companies/analysis",
            json!({"requirement_text": "引进机器人企业"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_assessment_then_render() {
        let (status, body) = post_json(
            "/api/v1/assessments",
            json!({"requirement_text": "想在苏州引进机器人方向的B轮企业", "company_id": "c002"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "heuristic");
        assert_eq!(body["panels"].as_array().unwrap().len(), 10);
        assert_eq!(
            body["assessment"]["negotiationTerms"].as_array().unwrap().len(),
            5
        );

        let (status, rendered) = post_json(
            "/api/v1/assessments/render",
            json!({"company": body["company"], "assessment": body["assessment"]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(rendered["markdown"]
            .as_str()
            .unwrap()
            .starts_with("# 苏州灵动机器人 政府招商评估报告"));
    }

    #[tokio::test]
    async fn test_ai_chat_without_key_is_llm_error() {
        let (status, body) = post_json(
            "/api/v1/ai-chat",
            json!({"messages": [{"role": "user", "content": "你好"}], "type": "parse_requirement"}),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "LLM_ERROR");
    }

    #[tokio::test]
    async fn test_ai_chat_rejects_empty_messages() {
        let (status, _) = post_json("/api/v1/ai-chat", json!({"messages": []})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_news_serves_fallback_when_store_empty() {
        let (status, body) = get_json("/api/v1/news").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["origin"], "fallback");
        assert_eq!(body["news"].as_array().unwrap().len(), 5);
        assert!(body["news"][0].get("publishDate").is_some());
    }

    #[tokio::test]
    async fn test_news_refresh_without_key_fails() {
        let (status, body) = post_json("/api/v1/news/refresh", json!({})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "LLM_ERROR");
    }
}

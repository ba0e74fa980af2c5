//! Generic chat proxy for clients that build their own prompts.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::assessment::prompts::government_assessment_tool;
use crate::errors::AppError;
use crate::llm_client::{ChatMessage, ToolPayload, ToolSpec, Usage};
use crate::matching::prompts::{
    analyze_company_tool, match_companies_tool, parse_requirement_tool, search_companies_tool,
};
use crate::normalize::parse_lenient;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AiChatRequest {
    pub messages: Vec<ChatMessage>,
    /// Name of a known tool to force. Plain completion otherwise.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AiChatResponse {
    pub success: bool,
    pub data: Value,
    pub usage: Option<Usage>,
}

/// The tool a request type forces, if it names one.
pub fn tool_for(kind: &str) -> Option<ToolSpec> {
    match kind {
        "parse_requirement" => Some(parse_requirement_tool()),
        "search_companies" => Some(search_companies_tool()),
        "match_companies" => Some(match_companies_tool()),
        "analyze_company" => Some(analyze_company_tool()),
        "government_assessment" => Some(government_assessment_tool()),
        _ => None,
    }
}

/// POST /api/v1/ai-chat
///
/// `data` holds the parsed tool arguments, or `{content}` for a plain answer.
pub async fn handle_ai_chat(
    State(state): State<AppState>,
    Json(request): Json<AiChatRequest>,
) -> Result<Json<AiChatResponse>, AppError> {
    if request.messages.is_empty() {
        return Err(AppError::Validation("messages cannot be empty".to_string()));
    }

    let tool = request.kind.as_deref().and_then(|kind| {
        let tool = tool_for(kind);
        if tool.is_none() {
            warn!("Unknown ai-chat type '{kind}', sending a plain completion");
        }
        tool
    });
    info!(
        "ai-chat: {} messages, tool={:?}",
        request.messages.len(),
        tool.as_ref().map(|t| t.name)
    );

    let completion = state.llm.call(&request.messages, tool.as_ref()).await?;

    let data = match completion.payload {
        ToolPayload::Arguments(args) => {
            parse_lenient(&args).map_err(|e| AppError::Llm(e.to_string()))?
        }
        ToolPayload::Content(content) => json!({ "content": content }),
        ToolPayload::Empty => json!({ "content": "" }),
    };

    Ok(Json(AiChatResponse {
        success: true,
        data,
        usage: completion.usage,
    }))
}

//! Axum route handlers for the Assessment API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::assessment::assessor::assess_company;
use crate::errors::AppError;
use crate::matching::handlers::{require_text, resolve_company};
use crate::matching::requirement_parser::parse_requirement_locally;
use crate::models::assessment::GovernmentAssessment;
use crate::models::company::{Company, RequirementProfile};
use crate::models::Source;
use crate::report::markdown::render_markdown;
use crate::report::panels::{render_panels, Panel};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AssessRequest {
    pub requirement_text: String,
    pub company_id: Option<String>,
    pub company: Option<Company>,
    /// Profile from an earlier parse. Keyword-parsed from the text when absent.
    pub profile: Option<RequirementProfile>,
}

#[derive(Debug, Serialize)]
pub struct AssessResponse {
    pub company: Company,
    pub assessment: GovernmentAssessment,
    pub source: Source,
    pub panels: Vec<Panel>,
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub company: Company,
    pub assessment: GovernmentAssessment,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub markdown: String,
    pub panels: Vec<Panel>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/assessments
///
/// Government assessment of one company, with the rendered panels.
/// Falls back to the canned local assessment when the LLM is unavailable.
pub async fn handle_assess(
    State(state): State<AppState>,
    Json(request): Json<AssessRequest>,
) -> Result<Json<AssessResponse>, AppError> {
    require_text(&request.requirement_text)?;
    let company = resolve_company(&state, request.company, request.company_id.as_deref())?;
    let profile = request
        .profile
        .unwrap_or_else(|| parse_requirement_locally(&request.requirement_text));

    let result = assess_company(&request.requirement_text, &profile, &company, &state.llm).await;
    let panels = render_panels(&company, &result.assessment);

    Ok(Json(AssessResponse {
        company,
        assessment: result.assessment,
        source: result.source,
        panels,
    }))
}

/// POST /api/v1/assessments/render
///
/// Renders a supplied assessment. Pure: no LLM call.
pub async fn handle_render(Json(request): Json<RenderRequest>) -> Json<RenderResponse> {
    Json(RenderResponse {
        markdown: render_markdown(&request.company, &request.assessment),
        panels: render_panels(&request.company, &request.assessment),
    })
}

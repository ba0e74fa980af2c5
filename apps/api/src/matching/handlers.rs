//! Axum route handlers for the Matching API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::matching::analysis::{analyze_company, AnalysisResult};
use crate::matching::matcher::{run_match, MatchOutcome};
use crate::matching::requirement_parser::{parse_requirement, ParsedRequirement};
use crate::matching::scoring::pre_filter;
use crate::models::company::{Company, MatchedCompany, RequirementProfile};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RequirementRequest {
    pub requirement_text: String,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub profile: RequirementProfile,
    /// Scored as given. When absent the catalog is pre-filtered and scored.
    pub companies: Option<Vec<Company>>,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub total_matched: usize,
    pub matches: Vec<MatchedCompany>,
}

#[derive(Debug, Serialize)]
pub struct CompanyListResponse {
    pub companies: Vec<Company>,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    pub requirement_text: String,
    pub company_id: Option<String>,
    pub company: Option<Company>,
}

pub(crate) fn require_text(text: &str) -> Result<(), AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "requirement_text cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// The company a request names: inline record first, then a catalog id.
pub(crate) fn resolve_company(
    state: &AppState,
    company: Option<Company>,
    company_id: Option<&str>,
) -> Result<Company, AppError> {
    if let Some(company) = company {
        if company.name.trim().is_empty() {
            return Err(AppError::Validation("company.name cannot be empty".to_string()));
        }
        return Ok(company);
    }
    let id = company_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("company or company_id is required".to_string()))?;
    state
        .catalog
        .get(id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Company {id} not found")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/requirements/parse
///
/// Parses a requirement into a profile. Always answers; `source` says whether
/// the LLM, the keyword parser, or both produced it.
pub async fn handle_parse_requirement(
    State(state): State<AppState>,
    Json(request): Json<RequirementRequest>,
) -> Result<Json<ParsedRequirement>, AppError> {
    require_text(&request.requirement_text)?;

    let parsed = parse_requirement(&request.requirement_text, &state.llm).await;

    Ok(Json(parsed))
}

/// POST /api/v1/matches
///
/// Full pipeline: parse → candidates → pre-filter → score → truncate.
pub async fn handle_match(
    State(state): State<AppState>,
    Json(request): Json<RequirementRequest>,
) -> Result<Json<MatchOutcome>, AppError> {
    require_text(&request.requirement_text)?;

    let outcome = run_match(
        &request.requirement_text,
        &state.llm,
        &state.catalog,
        state.scorer.as_ref(),
        state.config.match_limit,
    )
    .await?;

    Ok(Json(outcome))
}

/// POST /api/v1/matches/score
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    let candidates = match request.companies {
        Some(companies) => companies,
        None => pre_filter(&request.profile, state.catalog.all()),
    };

    let mut matches = state.scorer.score(&request.profile, &candidates).await?;
    let total_matched = matches.len();
    matches.truncate(state.config.match_limit);

    Ok(Json(ScoreResponse {
        total_matched,
        matches,
    }))
}

/// GET /api/v1/companies
pub async fn handle_list_companies(State(state): State<AppState>) -> Json<CompanyListResponse> {
    Json(CompanyListResponse {
        companies: state.catalog.all().to_vec(),
    })
}

/// GET /api/v1/companies/:id
pub async fn handle_get_company(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<Json<Company>, AppError> {
    let company = resolve_company(&state, None, Some(&company_id))?;
    Ok(Json(company))
}

/// POST /api/v1/companies/analysis
///
/// Short analysis of one company (inline record or catalog id) against a requirement.
pub async fn handle_analyze_company(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisResult>, AppError> {
    require_text(&request.requirement_text)?;
    let company = resolve_company(&state, request.company, request.company_id.as_deref())?;

    let result = analyze_company(&request.requirement_text, &company, &state.llm).await;

    Ok(Json(result))
}

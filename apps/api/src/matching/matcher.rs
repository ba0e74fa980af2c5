//! Match pipeline: orchestrates a full requirement-to-ranking run.
//!
//! Flow: parse_requirement → find_candidates (LLM search, else catalog) →
//!       pre_filter → scorer.score → truncate to the configured limit.
//!
//! No step fails on LLM trouble; each one degrades to its local heuristic and
//! records where its output came from.

use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::matching::catalog::{find_candidates, CompanyCatalog};
use crate::matching::requirement_parser::{parse_requirement, ParsedRequirement};
use crate::matching::scoring::{pre_filter, CompanyScorer};
use crate::models::company::MatchedCompany;
use crate::models::Source;

#[derive(Debug, Clone, Serialize)]
pub struct MatchOutcome {
    pub requirement: ParsedRequirement,
    pub candidate_source: Source,
    /// Candidates that survived pre-filtering, before truncation.
    pub total_matched: usize,
    pub matches: Vec<MatchedCompany>,
}

pub async fn run_match(
    requirement_text: &str,
    llm: &LlmClient,
    catalog: &CompanyCatalog,
    scorer: &dyn CompanyScorer,
    limit: usize,
) -> Result<MatchOutcome, AppError> {
    let requirement = parse_requirement(requirement_text, llm).await;

    let (companies, candidate_source) = find_candidates(&requirement.profile, llm, catalog).await;
    let candidates = pre_filter(&requirement.profile, &companies);
    info!(
        "Pre-filter kept {}/{} candidates",
        candidates.len(),
        companies.len()
    );

    let mut matches = scorer.score(&requirement.profile, &candidates).await?;
    let total_matched = matches.len();
    matches.truncate(limit);

    info!(
        "Match run complete: {} returned of {} (scorer={}, candidates={:?})",
        matches.len(),
        total_matched,
        scorer.backend(),
        candidate_source
    );

    Ok(MatchOutcome {
        requirement,
        candidate_source,
        total_matched,
        matches,
    })
}

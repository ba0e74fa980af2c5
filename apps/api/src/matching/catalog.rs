//! Company Catalog: the embedded demo dataset plus LLM-generated candidates.

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::system_prompt;
use crate::llm_client::LlmClient;
use crate::matching::prompts::{search_companies_tool, SEARCH_PROMPT_TEMPLATE, SEARCH_ROLE};
use crate::models::company::{Company, RequirementProfile};
use crate::models::Source;
use crate::normalize::{array_field, get_any, int_field, payload_value, string_field, string_list};

const EMBEDDED_COMPANIES: &str = include_str!("../../data/companies.json");

/// How many companies to ask the LLM for.
pub const SEARCH_COUNT: usize = 10;

/// Static demo companies, loaded once at startup.
#[derive(Debug, Clone)]
pub struct CompanyCatalog {
    companies: Vec<Company>,
}

impl CompanyCatalog {
    pub fn load_embedded() -> Result<Self> {
        let companies: Vec<Company> = serde_json::from_str(EMBEDDED_COMPANIES)
            .context("Embedded company catalog is not valid JSON")?;
        Ok(Self { companies })
    }

    pub fn all(&self) -> &[Company] {
        &self.companies
    }

    pub fn get(&self, id: &str) -> Option<&Company> {
        self.companies.iter().find(|c| c.id == id)
    }
}

/// Candidate companies for a profile: LLM-generated when possible, the catalog otherwise.
pub async fn find_candidates(
    profile: &RequirementProfile,
    llm: &LlmClient,
    catalog: &CompanyCatalog,
) -> (Vec<Company>, Source) {
    match search_companies(profile, llm).await {
        Ok(companies) if !companies.is_empty() => {
            info!("LLM generated {} candidate companies", companies.len());
            (companies, Source::Llm)
        }
        Ok(_) => {
            warn!("LLM company search returned no usable companies, using catalog");
            (catalog.all().to_vec(), Source::Heuristic)
        }
        Err(e) => {
            warn!("LLM company search failed, using catalog: {e}");
            (catalog.all().to_vec(), Source::Heuristic)
        }
    }
}

async fn search_companies(
    profile: &RequirementProfile,
    llm: &LlmClient,
) -> Result<Vec<Company>, AppError> {
    let profile_json = serde_json::to_string_pretty(profile)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize profile: {e}")))?;
    let prompt = SEARCH_PROMPT_TEMPLATE
        .replace("{profile_json}", &profile_json)
        .replace("{count}", &SEARCH_COUNT.to_string());

    let completion = llm
        .call_tool(&system_prompt(SEARCH_ROLE), &prompt, &search_companies_tool())
        .await?;
    let value = payload_value(&completion.payload)
        .map_err(|e| AppError::Llm(format!("Company search failed: {e}")))?;

    let items = array_field(&value, &["companies", "results", "data"])
        .ok_or_else(|| AppError::Llm("Company search returned no company list".to_string()))?;

    Ok(items
        .iter()
        .filter_map(company_from_value)
        .enumerate()
        .map(|(i, mut company)| {
            company.id = format!("ai_{}", i + 1);
            company
        })
        .collect())
}

/// Builds a company from a loosely-typed LLM record. Records without a name are dropped.
pub fn company_from_value(value: &Value) -> Option<Company> {
    let name = string_field(get_any(value, &["name", "company", "company_name"]));
    if name.is_empty() {
        return None;
    }

    let track = string_field(get_any(value, &["track", "sector"]));
    let mut industry = string_list(get_any(value, &["industry", "industries"]));
    if industry.is_empty() && !track.is_empty() {
        industry.push(track.clone());
    }

    Some(Company {
        id: String::new(),
        name,
        city: string_field(value.get("city")),
        province: string_field(value.get("province")),
        industry,
        track,
        register_year: int_field(get_any(value, &["register_year", "founded_year"]))
            .and_then(|y| i32::try_from(y).ok())
            .unwrap_or_default(),
        last_round: string_field(get_any(value, &["last_round", "round"])),
        last_round_date: string_field(get_any(value, &["last_round_date", "round_date"])),
        last_round_amount: string_field(get_any(value, &["last_round_amount", "amount"])),
        investors: string_list(value.get("investors")),
        headline: string_field(value.get("headline")),
        business_summary: string_field(get_any(value, &["business_summary", "summary"])),
        news_snippet: string_field(value.get("news_snippet")),
        growth_stage: string_field(value.get("growth_stage")),
        tags: string_list(value.get("tags")),
        raw_news_text: None,
    })
}

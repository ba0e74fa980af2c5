//! Requirement Parser: turns a free-text 招商 requirement into a `RequirementProfile`.
//!
//! The LLM answer is normalized and merged with the keyword parse: any field the
//! model left empty is filled locally. When the call fails outright, the keyword
//! parse is the result.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::system_prompt;
use crate::llm_client::LlmClient;
use crate::matching::keywords::{
    IndustryFamily, AB_ROUNDS, AB_ROUND_ALIASES, CITIES, EXTRA_KEYWORDS, INDUSTRIES,
    REGION_GROUPS, SCENARIOS, STAGES,
};
use crate::matching::prompts::{
    parse_requirement_tool, REQUIREMENT_PROMPT_TEMPLATE, REQUIREMENT_ROLE,
};
use crate::models::company::RequirementProfile;
use crate::models::Source;
use crate::normalize::{dedup_preserving_order, get_any, payload_value, string_field, string_list};

static RECENT_YEARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:过去|最近|近)(\d+|[一二两三四五六七八九十])年").expect("valid pattern")
});
static SINCE_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})年(?:以后|之后|至今)").expect("valid pattern"));
static FOUR_DIGIT_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4})").expect("valid pattern"));

/// Window assumed when a time window is set but carries no readable year.
const DEFAULT_WINDOW_YEARS: i32 = 2;

#[derive(Debug, Clone, Serialize)]
pub struct ParsedRequirement {
    pub profile: RequirementProfile,
    pub source: Source,
}

/// Parses a requirement with the LLM, falling back to (or filling from) the keyword parse.
pub async fn parse_requirement(text: &str, llm: &LlmClient) -> ParsedRequirement {
    let local = parse_requirement_locally(text);

    match request_profile(text, llm).await {
        Ok(profile) if !profile.is_empty() => {
            let (profile, filled) = merge_profiles(profile, &local);
            let source = if filled { Source::Merged } else { Source::Llm };
            info!("Requirement parsed by LLM (source={:?})", source);
            ParsedRequirement { profile, source }
        }
        Ok(_) => {
            warn!("LLM returned an empty requirement profile, using keyword parse");
            ParsedRequirement {
                profile: local,
                source: Source::Heuristic,
            }
        }
        Err(e) => {
            warn!("Requirement parsing via LLM failed, using keyword parse: {e}");
            ParsedRequirement {
                profile: local,
                source: Source::Heuristic,
            }
        }
    }
}

async fn request_profile(text: &str, llm: &LlmClient) -> Result<RequirementProfile, AppError> {
    let prompt = REQUIREMENT_PROMPT_TEMPLATE.replace("{requirement_text}", text);
    let completion = llm
        .call_tool(
            &system_prompt(REQUIREMENT_ROLE),
            &prompt,
            &parse_requirement_tool(),
        )
        .await?;
    let value = payload_value(&completion.payload)
        .map_err(|e| AppError::Llm(format!("Requirement parsing failed: {e}")))?;
    Ok(profile_from_value(&value))
}

/// Coerces whatever shape the model used into a profile.
pub fn profile_from_value(value: &Value) -> RequirementProfile {
    let value = value
        .get("profile")
        .filter(|v| v.is_object())
        .unwrap_or(value);

    RequirementProfile {
        region_preference: string_list(get_any(value, &["region_preference", "regions", "region"])),
        industry_preference: string_list(get_any(
            value,
            &["industry_preference", "industries", "industry"],
        )),
        stage_preference: string_list(get_any(value, &["stage_preference", "stages", "stage"])),
        time_window: string_field(get_any(value, &["time_window", "timeWindow"])),
        extra_preferences: string_list(get_any(
            value,
            &["extra_preferences", "extra_preference", "extras"],
        )),
        scenario: string_field(get_any(value, &["scenario", "scenarios"])),
    }
}

/// Fills every empty field of `primary` from `fallback`. Returns whether anything was filled.
pub fn merge_profiles(
    mut primary: RequirementProfile,
    fallback: &RequirementProfile,
) -> (RequirementProfile, bool) {
    let mut filled = false;

    fn fill_list(target: &mut Vec<String>, source: &[String], filled: &mut bool) {
        if target.is_empty() && !source.is_empty() {
            *target = source.to_vec();
            *filled = true;
        }
    }
    fn fill_text(target: &mut String, source: &str, filled: &mut bool) {
        if target.trim().is_empty() && !source.trim().is_empty() {
            *target = source.to_string();
            *filled = true;
        }
    }

    fill_list(&mut primary.region_preference, &fallback.region_preference, &mut filled);
    fill_list(&mut primary.industry_preference, &fallback.industry_preference, &mut filled);
    fill_list(&mut primary.stage_preference, &fallback.stage_preference, &mut filled);
    fill_list(&mut primary.extra_preferences, &fallback.extra_preferences, &mut filled);
    fill_text(&mut primary.time_window, &fallback.time_window, &mut filled);
    fill_text(&mut primary.scenario, &fallback.scenario, &mut filled);

    (primary, filled)
}

/// Keyword-based requirement parse. Deterministic, no I/O.
pub fn parse_requirement_locally(text: &str) -> RequirementProfile {
    let lower = text.to_lowercase();

    let mut regions: Vec<String> = Vec::new();
    for (group, cities) in REGION_GROUPS {
        if text.contains(group) {
            regions.extend(cities.iter().map(|c| c.to_string()));
        }
    }
    for city in CITIES {
        if text.contains(city) {
            regions.push(city.to_string());
        }
    }

    let industries: Vec<String> = INDUSTRIES
        .iter()
        .filter(|ind| lower.contains(&ind.to_lowercase()))
        .map(|ind| ind.to_string())
        .collect();

    let mut stages: Vec<String> = STAGES
        .iter()
        .filter(|stage| text.contains(*stage))
        .map(|stage| stage.to_string())
        .collect();
    if AB_ROUND_ALIASES.iter().any(|alias| text.contains(alias)) {
        stages.extend(AB_ROUNDS.iter().map(|s| s.to_string()));
    }

    let extras: Vec<String> = EXTRA_KEYWORDS
        .iter()
        .filter(|kw| text.contains(*kw))
        .map(|kw| kw.to_string())
        .collect();

    let industries = dedup_preserving_order(industries);
    let scenario = SCENARIOS
        .iter()
        .find(|sc| text.contains(*sc))
        .map(|sc| sc.to_string())
        .unwrap_or_else(|| infer_scenario(&industries));

    RequirementProfile {
        region_preference: dedup_preserving_order(regions),
        industry_preference: industries,
        stage_preference: dedup_preserving_order(stages),
        time_window: parse_time_window(text),
        extra_preferences: dedup_preserving_order(extras),
        scenario,
    }
}

/// Default carrier scenario for a set of industries.
pub fn infer_scenario(industries: &[String]) -> String {
    if IndustryFamily::Manufacturing.covers(industries) {
        "产业园 / 制造工厂".to_string()
    } else if IndustryFamily::Digital.covers(industries) {
        "创新园区 / 总部办公".to_string()
    } else if IndustryFamily::LifeScience.covers(industries) {
        "研发中心 / 实验室".to_string()
    } else {
        "创新园区".to_string()
    }
}

fn parse_time_window(text: &str) -> String {
    if let Some(caps) = RECENT_YEARS.captures(text) {
        if let Some(years) = parse_year_count(&caps[1]) {
            return format!("近{years}年内");
        }
    }
    if let Some(caps) = SINCE_YEAR.captures(text) {
        return format!("{}年以后", &caps[1]);
    }
    String::new()
}

fn parse_year_count(raw: &str) -> Option<u32> {
    if let Ok(n) = raw.parse::<u32>() {
        return Some(n);
    }
    let n = match raw {
        "一" => 1,
        "二" | "两" => 2,
        "三" => 3,
        "四" => 4,
        "五" => 5,
        "六" => 6,
        "七" => 7,
        "八" => 8,
        "九" => 9,
        "十" => 10,
        _ => return None,
    };
    Some(n)
}

/// First calendar year covered by a time window such as `近3年内` or `2022年以后`.
/// `None` when no window is set.
pub fn window_start_year(time_window: &str, current_year: i32) -> Option<i32> {
    let window = time_window.trim();
    if window.is_empty() {
        return None;
    }
    if let Some(caps) = RECENT_YEARS.captures(window) {
        let start = parse_year_count(&caps[1])
            .and_then(|years| i32::try_from(years).ok())
            .and_then(|years| current_year.checked_sub(years));
        return Some(start.unwrap_or(current_year.saturating_sub(DEFAULT_WINDOW_YEARS)));
    }
    if let Some(caps) = FOUR_DIGIT_YEAR.captures(window) {
        if let Ok(year) = caps[1].parse::<i32>() {
            return Some(year);
        }
    }
    Some(current_year.saturating_sub(DEFAULT_WINDOW_YEARS))
}

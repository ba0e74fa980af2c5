//! Company Scoring: pluggable, trait-based scorer that ranks candidates against a profile.
//!
//! Default: `LlmCompanyScorer` (tool call, merged with the heuristic for anything
//! the model skipped or got wrong). `KeywordCompanyScorer` is the pure heuristic.
//!
//! `AppState` holds an `Arc<dyn CompanyScorer>`, chosen at startup via config.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::system_prompt;
use crate::llm_client::LlmClient;
use crate::matching::keywords::{has_top_investor, GROWTH_FAST};
use crate::matching::prompts::{match_companies_tool, MATCH_PROMPT_TEMPLATE, MATCH_ROLE};
use crate::matching::requirement_parser::window_start_year;
use crate::models::company::{Company, MatchedCompany, RequirementProfile};
use crate::models::Source;
use crate::normalize::{array_field, get_any, payload_value, score_field, string_field};

const REGION_POINTS: u32 = 30;
const INDUSTRY_POINTS_EACH: u32 = 15;
const INDUSTRY_POINTS_MAX: u32 = 30;
const STAGE_POINTS: u32 = 20;
const EXTRA_POINTS_EACH: u32 = 10;
const TIME_WINDOW_BONUS: u32 = 5;
/// Awarded per dimension when the profile expresses no preference for it.
const NEUTRAL_REGION: u32 = 15;
const NEUTRAL_INDUSTRY: u32 = 15;
const NEUTRAL_STAGE: u32 = 10;
const NEUTRAL_EXTRA: u32 = 10;

/// Share of active criteria a company must match to survive pre-filtering.
const PRE_FILTER_RATIO: f32 = 0.3;

const DEFAULT_REASON: &str = "基本符合招商需求";

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The company scorer trait. Implement this to swap backends without touching
/// the pipeline or handlers. Results are sorted by score, descending.
#[async_trait]
pub trait CompanyScorer: Send + Sync {
    async fn score(
        &self,
        profile: &RequirementProfile,
        candidates: &[Company],
    ) -> Result<Vec<MatchedCompany>, AppError>;

    /// "keyword" | "llm", for logs.
    fn backend(&self) -> &'static str;
}

/// Pure-Rust weighted heuristic. Fast, deterministic, no LLM call.
pub struct KeywordCompanyScorer;

#[async_trait]
impl CompanyScorer for KeywordCompanyScorer {
    async fn score(
        &self,
        profile: &RequirementProfile,
        candidates: &[Company],
    ) -> Result<Vec<MatchedCompany>, AppError> {
        Ok(score_all(profile, candidates, Utc::now().year()))
    }

    fn backend(&self) -> &'static str {
        "keyword"
    }
}

/// Scores via the `match_companies` tool. Never fails on LLM problems: those
/// degrade to the keyword heuristic.
pub struct LlmCompanyScorer {
    pub llm: LlmClient,
}

#[async_trait]
impl CompanyScorer for LlmCompanyScorer {
    async fn score(
        &self,
        profile: &RequirementProfile,
        candidates: &[Company],
    ) -> Result<Vec<MatchedCompany>, AppError> {
        let current_year = Utc::now().year();
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let items = match request_matches(&self.llm, profile, candidates).await {
            Ok(items) => items,
            Err(e) => {
                warn!("LLM matching failed, using keyword scoring: {e}");
                return Ok(score_all(profile, candidates, current_year));
            }
        };

        let (matches, llm_scored) = merge_llm_matches(&items, profile, candidates, current_year);
        if llm_scored == 0 {
            warn!("LLM matching returned no usable entries, using keyword scoring");
        } else {
            info!(
                "LLM scored {}/{} candidates, rest filled by heuristic",
                llm_scored,
                candidates.len()
            );
        }
        Ok(matches)
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

async fn request_matches(
    llm: &LlmClient,
    profile: &RequirementProfile,
    candidates: &[Company],
) -> Result<Vec<Value>, AppError> {
    let candidate_view: Vec<Value> = candidates
        .iter()
        .map(|c| {
            serde_json::json!({
                "id": c.id,
                "name": c.name,
                "city": c.city,
                "province": c.province,
                "industry": c.industry,
                "track": c.track,
                "last_round": c.last_round,
                "last_round_date": c.last_round_date,
                "investors": c.investors,
                "business_summary": c.business_summary,
                "growth_stage": c.growth_stage,
                "tags": c.tags,
            })
        })
        .collect();

    let prompt = MATCH_PROMPT_TEMPLATE
        .replace("{profile_json}", &to_prompt_json(profile)?)
        .replace("{candidates_json}", &to_prompt_json(&candidate_view)?);

    let completion = llm
        .call_tool(&system_prompt(MATCH_ROLE), &prompt, &match_companies_tool())
        .await?;
    let value = payload_value(&completion.payload)
        .map_err(|e| AppError::Llm(format!("Company matching failed: {e}")))?;

    array_field(&value, &["matches", "results", "data"])
        .cloned()
        .ok_or_else(|| AppError::Llm("Company matching returned no match list".to_string()))
}

pub(crate) fn to_prompt_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize prompt payload: {e}")))
}

// ────────────────────────────────────────────────────────────────────────────
// Merging LLM output with the heuristic
// ────────────────────────────────────────────────────────────────────────────

/// Merges LLM match entries with the candidate list.
///
/// - entries whose id (or name) is not a candidate are dropped
/// - the first entry per company wins
/// - entries without a readable score are dropped
/// - blank reasons take the heuristic reason
/// - candidates the model skipped get the heuristic score
///
/// Returns the sorted matches and how many of them were scored by the LLM.
pub fn merge_llm_matches(
    items: &[Value],
    profile: &RequirementProfile,
    candidates: &[Company],
    current_year: i32,
) -> (Vec<MatchedCompany>, usize) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut matches: Vec<MatchedCompany> = Vec::with_capacity(candidates.len());

    for item in items {
        let id = string_field(get_any(item, &["company_id", "companyId", "id"]));
        let name = string_field(get_any(item, &["company_name", "name"]));
        let company = candidates
            .iter()
            .find(|c| !id.is_empty() && c.id == id)
            .or_else(|| candidates.iter().find(|c| !name.is_empty() && c.name == name));
        let Some(company) = company else {
            continue;
        };
        if seen.contains(&company.id) {
            continue;
        }
        let Some(score) = score_field(get_any(item, &["score", "match_score"])) else {
            continue;
        };

        let mut reason = string_field(get_any(item, &["reason", "match_reason"]));
        if reason.is_empty() {
            reason = score_company(profile, company, current_year).match_reason;
        }

        seen.insert(company.id.clone());
        matches.push(MatchedCompany {
            company_id: company.id.clone(),
            match_score: score,
            match_reason: reason,
            company: company.clone(),
            source: Source::Llm,
        });
    }

    let llm_scored = matches.len();
    matches.extend(
        candidates
            .iter()
            .filter(|c| !seen.contains(&c.id))
            .map(|c| score_company(profile, c, current_year)),
    );
    sort_matches(&mut matches);

    (matches, llm_scored)
}

// ────────────────────────────────────────────────────────────────────────────
// Heuristic scoring
// ────────────────────────────────────────────────────────────────────────────

pub(crate) fn region_matches(pref: &str, company: &Company) -> bool {
    let pref = pref.trim();
    if pref.is_empty() {
        return false;
    }
    (!company.city.is_empty() && (company.city.contains(pref) || pref.contains(&company.city)))
        || (!company.province.is_empty() && company.province.contains(pref))
}

pub(crate) fn industry_matches(pref: &str, company: &Company) -> bool {
    let pref = pref.trim().to_lowercase();
    if pref.is_empty() {
        return false;
    }
    company.industry.iter().any(|i| {
        let i = i.to_lowercase();
        !i.is_empty() && (i.contains(&pref) || pref.contains(&i))
    }) || company.track.to_lowercase().contains(&pref)
}

pub(crate) fn stage_matches(pref: &str, company: &Company) -> bool {
    let pref_core = pref.trim().replacen('轮', "", 1);
    let round_core = company.last_round.trim().replacen('轮', "", 1);
    if pref_core.is_empty() || round_core.is_empty() {
        return false;
    }
    company.last_round.contains(&pref_core) || pref.contains(&round_core)
}

/// Keeps companies matching enough of the active region/industry/stage criteria.
pub fn pre_filter(profile: &RequirementProfile, companies: &[Company]) -> Vec<Company> {
    if profile.has_no_core_filters() {
        return companies.to_vec();
    }

    companies
        .iter()
        .filter(|company| {
            let mut active = 0u32;
            let mut matched = 0u32;

            let mut check = |prefs: &[String], test: fn(&str, &Company) -> bool| {
                if !prefs.is_empty() {
                    active += 1;
                    if prefs.iter().any(|p| test(p, company)) {
                        matched += 1;
                    }
                }
            };
            check(&profile.region_preference, region_matches);
            check(&profile.industry_preference, industry_matches);
            check(&profile.stage_preference, stage_matches);

            matched as f32 >= (active as f32 * PRE_FILTER_RATIO).max(1.0)
        })
        .cloned()
        .collect()
}

/// Weighted heuristic score: region 30, industry 30, stage 20, extras 20, +5 recency.
pub fn score_company(
    profile: &RequirementProfile,
    company: &Company,
    current_year: i32,
) -> MatchedCompany {
    let mut score = 0u32;
    let mut reasons: Vec<String> = Vec::new();

    if profile.region_preference.is_empty() {
        score += NEUTRAL_REGION;
    } else if profile
        .region_preference
        .iter()
        .any(|r| region_matches(r, company))
    {
        score += REGION_POINTS;
        reasons.push(format!("地域匹配（{}）", company.city));
    }

    if profile.industry_preference.is_empty() {
        score += NEUTRAL_INDUSTRY;
    } else {
        let matched = profile
            .industry_preference
            .iter()
            .filter(|ind| industry_matches(ind, company))
            .count() as u32;
        if matched > 0 {
            score += (matched * INDUSTRY_POINTS_EACH).min(INDUSTRY_POINTS_MAX);
            reasons.push(format!("赛道匹配（{}）", company.track));
        }
    }

    if profile.stage_preference.is_empty() {
        score += NEUTRAL_STAGE;
    } else if profile
        .stage_preference
        .iter()
        .any(|s| stage_matches(s, company))
    {
        score += STAGE_POINTS;
        reasons.push(format!("融资阶段符合（{}）", company.last_round));
    }

    if profile.extra_preferences.is_empty() {
        score += NEUTRAL_EXTRA;
    } else {
        let wants = |needles: &[&str]| {
            profile
                .extra_preferences
                .iter()
                .any(|p| needles.iter().any(|n| p.contains(n)))
        };
        if wants(&["头部", "投资"]) && has_top_investor(&company.investors) {
            score += EXTRA_POINTS_EACH;
            reasons.push("头部基金背书".to_string());
        }
        if wants(&["扩张", "增长"]) && company.growth_stage == GROWTH_FAST {
            score += EXTRA_POINTS_EACH;
            reasons.push("处于快速增长期".to_string());
        }
    }

    if let Some(start) = window_start_year(&profile.time_window, current_year) {
        if company.last_round_year().is_some_and(|y| y >= start) {
            score += TIME_WINDOW_BONUS;
        }
    }

    let match_reason = if reasons.is_empty() {
        DEFAULT_REASON.to_string()
    } else {
        reasons.join("；")
    };

    MatchedCompany {
        company_id: company.id.clone(),
        match_score: score.min(100),
        match_reason,
        company: company.clone(),
        source: Source::Heuristic,
    }
}

/// Heuristic scores for every candidate, best first.
pub fn score_all(
    profile: &RequirementProfile,
    candidates: &[Company],
    current_year: i32,
) -> Vec<MatchedCompany> {
    let mut matches: Vec<MatchedCompany> = candidates
        .iter()
        .map(|c| score_company(profile, c, current_year))
        .collect();
    sort_matches(&mut matches);
    matches
}

/// Descending by score; stable so equal scores keep candidate order.
fn sort_matches(matches: &mut [MatchedCompany]) {
    matches.sort_by(|a, b| b.match_score.cmp(&a.match_score));
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::Provider;
    use serde_json::json;

    const YEAR: i32 = 2026;

    fn company(id: &str, city: &str, industry: &[&str], round: &str) -> Company {
        Company {
            id: id.to_string(),
            name: format!("公司{id}"),
            city: city.to_string(),
            province: String::new(),
            industry: industry.iter().map(|s| s.to_string()).collect(),
            track: industry.first().map(|s| s.to_string()).unwrap_or_default(),
            last_round: round.to_string(),
            last_round_date: "2024-05".to_string(),
            ..Default::default()
        }
    }

    fn profile(regions: &[&str], industries: &[&str], stages: &[&str]) -> RequirementProfile {
        let to_vec = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        RequirementProfile {
            region_preference: to_vec(regions),
            industry_preference: to_vec(industries),
            stage_preference: to_vec(stages),
            ..Default::default()
        }
    }

    #[test]
    fn test_neutral_profile_scores_fifty() {
        let c = company("a", "上海", &["AI"], "A轮");
        let m = score_company(&RequirementProfile::default(), &c, YEAR);
        // 15 + 15 + 10 + 10
        assert_eq!(m.match_score, 50);
        assert_eq!(m.match_reason, DEFAULT_REASON);
        assert_eq!(m.source, Source::Heuristic);
    }

    #[test]
    fn test_full_match_scores_with_reasons() {
        let mut c = company("a", "苏州", &["机器人", "智能制造"], "B轮");
        c.investors = vec!["高瓴创投".to_string()];
        c.growth_stage = GROWTH_FAST.to_string();
        let mut p = profile(&["苏州"], &["机器人", "智能制造"], &["B轮"]);
        p.extra_preferences = vec!["头部基金".to_string(), "扩张".to_string()];
        p.time_window = "近3年内".to_string();

        let m = score_company(&p, &c, YEAR);
        // 30 + 30 + 20 + 20 + 5 → clamped to 100
        assert_eq!(m.match_score, 100);
        assert_eq!(
            m.match_reason,
            "地域匹配（苏州）；赛道匹配（机器人）；融资阶段符合（B轮）；头部基金背书；处于快速增长期"
        );
    }

    #[test]
    fn test_single_industry_match_is_fifteen() {
        let c = company("a", "北京", &["芯片"], "C轮");
        let p = profile(&["上海"], &["芯片", "医疗"], &["A轮"]);
        let m = score_company(&p, &c, YEAR);
        // region miss 0, industry 15, stage miss 0, extras neutral 10
        assert_eq!(m.match_score, 25);
    }

    #[test]
    fn test_time_window_bonus_requires_recent_round() {
        let mut c = company("a", "上海", &["AI"], "A轮");
        let mut p = RequirementProfile {
            time_window: "2025年以后".to_string(),
            ..Default::default()
        };
        assert_eq!(score_company(&p, &c, YEAR).match_score, 50);
        c.last_round_date = "2025-02".to_string();
        assert_eq!(score_company(&p, &c, YEAR).match_score, 55);
        p.time_window.clear();
        assert_eq!(score_company(&p, &c, YEAR).match_score, 50);
    }

    #[test]
    fn test_stage_matching_rules() {
        let plus = company("a", "", &[], "A+轮");
        assert!(stage_matches("A轮", &plus));
        let pre = company("b", "", &[], "Pre-A轮");
        assert!(stage_matches("A轮", &pre));
        let b = company("c", "", &[], "B轮");
        assert!(!stage_matches("A轮", &b));
        let unknown = company("d", "", &[], "");
        assert!(!stage_matches("A轮", &unknown));
    }

    #[test]
    fn test_region_matching_rules() {
        let mut c = company("a", "苏州", &[], "");
        c.province = "江苏".to_string();
        assert!(region_matches("苏州", &c));
        assert!(region_matches("江苏", &c));
        assert!(region_matches("苏州工业园区", &c));
        assert!(!region_matches("上海", &c));
        let blank = company("b", "", &[], "");
        assert!(!region_matches("上海", &blank));
    }

    #[test]
    fn test_industry_matching_is_case_insensitive_and_bidirectional() {
        let c = company("a", "", &["SaaS"], "");
        assert!(industry_matches("saas", &c));
        let medical = company("b", "", &["医疗健康"], "");
        assert!(industry_matches("医疗", &medical));
        let ai = company("c", "", &["AI"], "");
        assert!(industry_matches("AI医疗", &ai));
    }

    #[test]
    fn test_pre_filter_without_core_filters_keeps_all() {
        let companies = vec![company("a", "上海", &["AI"], "A轮"), company("b", "", &[], "")];
        assert_eq!(pre_filter(&RequirementProfile::default(), &companies).len(), 2);
    }

    #[test]
    fn test_pre_filter_needs_one_matching_criterion() {
        let companies = vec![
            company("a", "上海", &["AI"], "A轮"),
            company("b", "北京", &["芯片"], "D轮"),
            company("c", "深圳", &["AI"], "D轮"),
        ];
        let p = profile(&["上海"], &["AI"], &["A轮"]);
        let kept: Vec<String> = pre_filter(&p, &companies).into_iter().map(|c| c.id).collect();
        assert_eq!(kept, vec!["a", "c"]);
    }

    #[test]
    fn test_score_all_sorted_descending_stable() {
        let companies = vec![
            company("low", "北京", &["芯片"], "D轮"),
            company("high", "上海", &["AI"], "A轮"),
            company("low2", "北京", &["芯片"], "D轮"),
        ];
        let p = profile(&["上海"], &["AI"], &["A轮"]);
        let ids: Vec<String> = score_all(&p, &companies, YEAR)
            .into_iter()
            .map(|m| m.company_id)
            .collect();
        assert_eq!(ids, vec!["high", "low", "low2"]);
    }

    #[test]
    fn test_merge_drops_unknown_and_duplicate_ids() {
        let candidates = vec![company("a", "上海", &["AI"], "A轮"), company("b", "北京", &["芯片"], "B轮")];
        let items = vec![
            json!({"company_id": "ghost", "score": 99, "reason": "不存在"}),
            json!({"company_id": "b", "score": "88", "reason": "芯片龙头"}),
            json!({"company_id": "b", "score": 10, "reason": "重复"}),
        ];
        let (matches, llm_scored) =
            merge_llm_matches(&items, &RequirementProfile::default(), &candidates, YEAR);
        assert_eq!(llm_scored, 1);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].company_id, "b");
        assert_eq!(matches[0].match_score, 88);
        assert_eq!(matches[0].match_reason, "芯片龙头");
        assert_eq!(matches[0].source, Source::Llm);
        // "a" was skipped by the model and gets the neutral heuristic score.
        assert_eq!(matches[1].company_id, "a");
        assert_eq!(matches[1].match_score, 50);
        assert_eq!(matches[1].source, Source::Heuristic);
    }

    #[test]
    fn test_merge_accepts_aliases_and_names() {
        let candidates = vec![company("a", "上海", &["AI"], "A轮")];
        let items = vec![json!({"name": "公司a", "match_score": 72.4, "match_reason": ""})];
        let (matches, llm_scored) =
            merge_llm_matches(&items, &RequirementProfile::default(), &candidates, YEAR);
        assert_eq!(llm_scored, 1);
        assert_eq!(matches[0].match_score, 72);
        assert_eq!(matches[0].match_reason, DEFAULT_REASON);
    }

    #[test]
    fn test_merge_skips_unscored_entries() {
        let candidates = vec![company("a", "上海", &["AI"], "A轮")];
        let items = vec![json!({"company_id": "a", "reason": "没有分数"})];
        let (matches, llm_scored) =
            merge_llm_matches(&items, &RequirementProfile::default(), &candidates, YEAR);
        assert_eq!(llm_scored, 0);
        assert_eq!(matches[0].source, Source::Heuristic);
    }

    #[tokio::test]
    async fn test_llm_scorer_falls_back_when_unconfigured() {
        let scorer = LlmCompanyScorer {
            llm: LlmClient::new(Provider::Moonshot, None),
        };
        let candidates = vec![company("a", "上海", &["AI"], "A轮")];
        let matches = scorer
            .score(&RequirementProfile::default(), &candidates)
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].source, Source::Heuristic);
    }

    #[tokio::test]
    async fn test_llm_scorer_merges_mocked_response() {
        let mut server = mockito::Server::new_async().await;
        let args = json!({"matches": [{"company_id": "b", "score": 91, "reason": "高度契合"}]}).to_string();
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(
                json!({"choices": [{"message": {"tool_calls": [{"function": {"arguments": args}}]}}]})
                    .to_string(),
            )
            .create_async()
            .await;

        let scorer = LlmCompanyScorer {
            llm: LlmClient::new(Provider::Moonshot, Some("k".to_string())).with_base_url(server.url()),
        };
        let candidates = vec![company("a", "上海", &["AI"], "A轮"), company("b", "北京", &["芯片"], "B轮")];
        let matches = scorer
            .score(&RequirementProfile::default(), &candidates)
            .await
            .unwrap();
        assert_eq!(matches[0].company_id, "b");
        assert_eq!(matches[0].match_score, 91);
        assert_eq!(matches[1].source, Source::Heuristic);
    }

    #[tokio::test]
    async fn test_keyword_scorer_backend_label() {
        assert_eq!(KeywordCompanyScorer.backend(), "keyword");
        let matches = KeywordCompanyScorer
            .score(&RequirementProfile::default(), &[])
            .await
            .unwrap();
        assert!(matches.is_empty());
    }
}

//! Short investment-attraction analysis of one company.
//!
//! The LLM answer is normalized field by field; anything blank or unreadable
//! is taken from `generate_local_analysis`, which also stands in whole when
//! the call fails.

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::system_prompt;
use crate::llm_client::LlmClient;
use crate::matching::keywords::{has_top_investor, GROWTH_EARLY, GROWTH_FAST, GROWTH_MATURE};
use crate::matching::prompts::{analyze_company_tool, ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_ROLE};
use crate::matching::scoring::to_prompt_json;
use crate::models::company::{Company, CompanyAnalysis, Recommendation};
use crate::models::Source;
use crate::normalize::{get_any, payload_value, sentence_list, string_field};

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub analysis: CompanyAnalysis,
    pub source: Source,
}

pub async fn analyze_company(
    requirement_text: &str,
    company: &Company,
    llm: &LlmClient,
) -> AnalysisResult {
    let local = generate_local_analysis(company);

    let value = match request_analysis(requirement_text, company, llm).await {
        Ok(value) => value,
        Err(e) => {
            warn!("Company analysis for {} failed, using local analysis: {e}", company.name);
            return AnalysisResult {
                analysis: local,
                source: Source::Heuristic,
            };
        }
    };

    let (analysis, backfilled) = analysis_from_value(&value, &local);
    let source = if backfilled { Source::Merged } else { Source::Llm };
    info!("Analyzed {} ({:?})", company.name, source);
    AnalysisResult { analysis, source }
}

async fn request_analysis(
    requirement_text: &str,
    company: &Company,
    llm: &LlmClient,
) -> Result<Value, AppError> {
    let prompt = ANALYSIS_PROMPT_TEMPLATE
        .replace("{requirement_text}", requirement_text)
        .replace("{company_json}", &to_prompt_json(company)?);
    let completion = llm
        .call_tool(&system_prompt(ANALYSIS_ROLE), &prompt, &analyze_company_tool())
        .await?;
    payload_value(&completion.payload)
        .map_err(|e| AppError::Llm(format!("Company analysis failed: {e}")))
}

/// Normalizes an `analyze_company` payload. Returns `true` when any field came from `local`.
pub fn analysis_from_value(value: &Value, local: &CompanyAnalysis) -> (CompanyAnalysis, bool) {
    let mut backfilled = false;

    let mut list_or_local = |items: Vec<String>, fallback: &[String]| {
        if items.is_empty() {
            backfilled = true;
            fallback.to_vec()
        } else {
            items
        }
    };
    let match_points = list_or_local(
        sentence_list(get_any(value, &["alignment_rationale", "match_points", "matchPoints"])),
        &local.match_points,
    );
    let risks = list_or_local(sentence_list(value.get("risks")), &local.risks);

    let mut text_or_local = |text: String, fallback: &str| {
        if text.is_empty() {
            backfilled = true;
            fallback.to_string()
        } else {
            text
        }
    };
    let suitable_venue = text_or_local(
        string_field(get_any(value, &["venue_recommendation", "suitable_venue", "suitableVenue"])),
        &local.suitable_venue,
    );
    let recommendation_reason = text_or_local(
        string_field(get_any(
            value,
            &["recommendation_rationale", "recommendation_reason", "recommendationReason"],
        )),
        &local.recommendation_reason,
    );

    let recommendation = match Recommendation::from_loose(&string_field(value.get("recommendation")))
    {
        Some(r) => r,
        None => {
            backfilled = true;
            local.recommendation
        }
    };

    (
        CompanyAnalysis {
            match_points,
            risks,
            suitable_venue,
            recommendation,
            recommendation_reason,
        },
        backfilled,
    )
}

/// Venue by exact industry, first rule wins. Narrower than `IndustryFamily`:
/// plain 医疗 and 人工智能 fall through to the default.
const VENUE_RULES: [(&[&str], &str); 3] = [
    (
        &["智能制造", "机器人", "新能源", "新材料"],
        "适合入驻产业园区或智能制造基地，需考虑生产厂房需求",
    ),
    (
        &["生物医药", "医疗健康", "基因"],
        "适合入驻生物医药产业园或研发型载体，需配套实验室设施",
    ),
    (
        &["AI", "云计算", "大数据", "SaaS"],
        "适合入驻科技创新园区或甲级写字楼，侧重办公研发空间",
    ),
];

const DEFAULT_VENUE: &str = "建议根据企业实际业务需求匹配合适的产业载体";

/// Canned analysis from the company record alone.
pub fn generate_local_analysis(company: &Company) -> CompanyAnalysis {
    let top_investor = has_top_investor(&company.investors);

    let mut match_points = Vec::new();
    if company.growth_stage == GROWTH_FAST {
        match_points.push("公司处于快速增长阶段，发展势头良好".to_string());
    }
    if top_investor {
        let names: Vec<&str> = company.investors.iter().take(2).map(String::as_str).collect();
        match_points.push(format!("获得头部投资机构背书（{}）", names.join("、")));
    }
    if !company.tags.is_empty() {
        let tags: Vec<&str> = company.tags.iter().take(2).map(String::as_str).collect();
        match_points.push(format!("具备差异化优势：{}", tags.join("、")));
    }
    if match_points.is_empty() {
        match_points.push(format!("在{}赛道有明确定位", company.track));
        match_points.push(format!("已完成{}融资，具备一定资金实力", company.last_round));
    }

    let mut risks = Vec::new();
    if company.growth_stage == GROWTH_EARLY {
        risks.push("公司处于早期阶段，商业模式尚未完全验证".to_string());
    } else if company.last_round.contains("天使") || company.last_round.contains("Pre") {
        risks.push("融资轮次较早，后续融资存在不确定性".to_string());
    }
    if company
        .tags
        .iter()
        .any(|t| t.contains("临床") || t.contains("试验"))
    {
        risks.push("产品处于研发/试验阶段，商业化周期较长".to_string());
    }
    if risks.is_empty() {
        risks.push("需关注行业竞争态势及市场变化".to_string());
    }

    let suitable_venue = VENUE_RULES
        .iter()
        .find(|(industries, _)| company.industry.iter().any(|i| industries.contains(&i.as_str())))
        .map(|(_, venue)| *venue)
        .unwrap_or(DEFAULT_VENUE);

    let (recommendation, reason) = if company.growth_stage == GROWTH_FAST && top_investor {
        (
            Recommendation::Recommended,
            "公司发展势头良好，获头部资本认可，是优质招商目标",
        )
    } else if company.growth_stage == GROWTH_MATURE {
        (
            Recommendation::Recommended,
            "公司已进入成熟期，业务稳定，适合作为园区标杆企业引进",
        )
    } else if company.growth_stage == GROWTH_EARLY {
        (
            Recommendation::Cautious,
            "公司处于早期阶段，建议持续跟踪发展情况后再做决策",
        )
    } else {
        (
            Recommendation::Recommended,
            "综合评估符合招商需求，建议进一步对接洽谈",
        )
    };

    CompanyAnalysis {
        match_points,
        risks,
        suitable_venue: suitable_venue.to_string(),
        recommendation,
        recommendation_reason: reason.to_string(),
    }
}

//! Government Assessment: LLM report with field-level backfill.
//!
//! Flow: local assessment (always built) → `government_assessment` tool call →
//!       field-by-field normalization → blanks taken from the local report.
//!
//! Every backfilled field's dotted path (`riskAssessment.policyRisk.source`)
//! is appended to `insufficientInfo`, so the client can tell which parts of
//! the report the model did not support.

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::assessment::local::generate_local_assessment;
use crate::assessment::prompts::{
    government_assessment_tool, ASSESSMENT_PROMPT_TEMPLATE, ASSESSMENT_ROLE,
};
use crate::errors::AppError;
use crate::llm_client::prompts::system_prompt;
use crate::llm_client::LlmClient;
use crate::matching::scoring::to_prompt_json;
use crate::models::assessment::{
    CompanyProfile, Conclusion, CoreValue, CredibilityLevel, GovernmentAssessment,
    IndustryMatch, IntroduceRecommendation, IntroductionStrategy, LandingAssessment, MatchLevel,
    RiskAssessment, RiskItem, NEGOTIATION_TERM_COUNT,
};
use crate::models::company::{Company, RequirementProfile};
use crate::models::Source;
use crate::normalize::{dedup_preserving_order, int_field, payload_value, sentence_list, string_field};

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentResult {
    pub assessment: GovernmentAssessment,
    pub source: Source,
}

pub async fn assess_company(
    requirement_text: &str,
    profile: &RequirementProfile,
    company: &Company,
    llm: &LlmClient,
) -> AssessmentResult {
    let local = generate_local_assessment(profile, company);

    let value = match request_assessment(requirement_text, company, llm).await {
        Ok(value) => value,
        Err(e) => {
            warn!("Assessment for {} failed, using local assessment: {e}", company.name);
            return AssessmentResult {
                assessment: local,
                source: Source::Heuristic,
            };
        }
    };

    let (assessment, backfilled) = assessment_from_value(&value, &local);
    let source = if backfilled.is_empty() {
        Source::Llm
    } else {
        info!(
            "Assessment for {} backfilled {} fields locally",
            company.name,
            backfilled.len()
        );
        Source::Merged
    };

    AssessmentResult { assessment, source }
}

async fn request_assessment(
    requirement_text: &str,
    company: &Company,
    llm: &LlmClient,
) -> Result<Value, AppError> {
    let prompt = ASSESSMENT_PROMPT_TEMPLATE
        .replace("{requirement_text}", requirement_text)
        .replace("{company_json}", &to_prompt_json(company)?);
    let completion = llm
        .call_tool(
            &system_prompt(ASSESSMENT_ROLE),
            &prompt,
            &government_assessment_tool(),
        )
        .await?;
    payload_value(&completion.payload)
        .map_err(|e| AppError::Llm(format!("Government assessment failed: {e}")))
}

// ────────────────────────────────────────────────────────────────────────────
// Field-level normalization
// ────────────────────────────────────────────────────────────────────────────

fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Follows a dotted camelCase path, accepting the snake_case spelling per segment.
fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |value, key| {
        value.get(key).or_else(|| value.get(snake_case(key).as_str()))
    })
}

/// Reads fields out of the payload and records the path of every one that was blank.
struct Backfill<'a> {
    root: &'a Value,
    missing: Vec<String>,
}

impl<'a> Backfill<'a> {
    fn new(root: &'a Value) -> Self {
        Self {
            root,
            missing: Vec::new(),
        }
    }

    fn text(&mut self, path: &str, fallback: &str) -> String {
        let text = string_field(lookup(self.root, path));
        if text.is_empty() {
            self.missing.push(path.to_string());
            fallback.to_string()
        } else {
            text
        }
    }

    fn list(&mut self, path: &str, fallback: &[String]) -> Vec<String> {
        let items = sentence_list(lookup(self.root, path));
        if items.is_empty() {
            self.missing.push(path.to_string());
            fallback.to_vec()
        } else {
            items
        }
    }

    fn choice<T>(&mut self, path: &str, parse: fn(&str) -> Option<T>, fallback: T) -> T {
        match parse(&string_field(lookup(self.root, path))) {
            Some(value) => value,
            None => {
                self.missing.push(path.to_string());
                fallback
            }
        }
    }

    fn risk(&mut self, path: &str, fallback: &RiskItem) -> RiskItem {
        RiskItem {
            source: self.text(&format!("{path}.source"), &fallback.source),
            local_impact: self.text(&format!("{path}.localImpact"), &fallback.local_impact),
        }
    }

    fn rating(&mut self, path: &str, fallback: u8) -> u8 {
        match read_rating(lookup(self.root, path)) {
            Some(rating) => rating,
            None => {
                self.missing.push(path.to_string());
                fallback
            }
        }
    }
}

/// 1–5 from a number, a `"4星"`-style string, or a run of ★.
fn read_rating(value: Option<&Value>) -> Option<u8> {
    let stars = match value {
        Some(Value::String(s)) if s.contains('★') => {
            Some(s.chars().filter(|c| *c == '★').count() as i64)
        }
        other => int_field(other),
    }?;
    if stars <= 0 {
        return None;
    }
    Some(stars.clamp(1, 5) as u8)
}

/// Exactly `NEGOTIATION_TERM_COUNT` terms: the model's first, padded from `fallback`.
fn fit_terms(mut terms: Vec<String>, fallback: &[String]) -> Vec<String> {
    for term in fallback {
        if terms.len() >= NEGOTIATION_TERM_COUNT {
            break;
        }
        if !terms.contains(term) {
            terms.push(term.clone());
        }
    }
    terms.truncate(NEGOTIATION_TERM_COUNT);
    terms
}

/// Normalizes a `government_assessment` payload against the local report.
/// Returns the merged report and the dotted paths that were backfilled.
pub fn assessment_from_value(
    value: &Value,
    local: &GovernmentAssessment,
) -> (GovernmentAssessment, Vec<String>) {
    let mut b = Backfill::new(value);

    let lp = &local.company_profile;
    let company_profile = CompanyProfile {
        industry_stage: b.text("companyProfile.industryStage", &lp.industry_stage),
        core_technology: b.text("companyProfile.coreTechnology", &lp.core_technology),
        development_stage: b.text("companyProfile.developmentStage", &lp.development_stage),
        summary: b.text("companyProfile.summary", &lp.summary),
    };

    let la = &local.landing_assessment;
    let landing_assessment = LandingAssessment {
        credibility_level: b.choice(
            "landingAssessment.credibilityLevel",
            CredibilityLevel::from_loose,
            la.credibility_level,
        ),
        strategic_alignment: b.text("landingAssessment.strategicAlignment", &la.strategic_alignment),
        irreplaceability: b.text("landingAssessment.irreplaceability", &la.irreplaceability),
        input_output_logic: b.text("landingAssessment.inputOutputLogic", &la.input_output_logic),
        key_evidence: b.list("landingAssessment.keyEvidence", &la.key_evidence),
    };

    let lm = &local.industry_match;
    let industry_match = IndustryMatch {
        match_level: b.choice("industryMatch.matchLevel", MatchLevel::from_loose, lm.match_level),
        dominant_industry_fit: b.text("industryMatch.dominantIndustryFit", &lm.dominant_industry_fit),
        chain_effect: b.text("industryMatch.chainEffect", &lm.chain_effect),
        cluster_potential: b.text("industryMatch.clusterPotential", &lm.cluster_potential),
    };

    let lv = &local.core_value;
    let core_value = CoreValue {
        industry_value: b.text("coreValue.industryValue", &lv.industry_value),
        economic_value: b.text("coreValue.economicValue", &lv.economic_value),
        strategic_value: b.text("coreValue.strategicValue", &lv.strategic_value),
    };

    let lr = &local.risk_assessment;
    let risk_assessment = RiskAssessment {
        financial_risk: b.risk("riskAssessment.financialRisk", &lr.financial_risk),
        business_risk: b.risk("riskAssessment.businessRisk", &lr.business_risk),
        competition_risk: b.risk("riskAssessment.competitionRisk", &lr.competition_risk),
        policy_risk: b.risk("riskAssessment.policyRisk", &lr.policy_risk),
    };

    let ls = &local.introduction_strategy;
    let introduction_strategy = IntroductionStrategy {
        recommend_introduce: b.choice(
            "introductionStrategy.recommendIntroduce",
            IntroduceRecommendation::from_loose,
            ls.recommend_introduce,
        ),
        recommended_form: b.text("introductionStrategy.recommendedForm", &ls.recommended_form),
        policy_priority: b.list("introductionStrategy.policyPriority", &ls.policy_priority),
        not_recommended_policy: b.list(
            "introductionStrategy.notRecommendedPolicy",
            &ls.not_recommended_policy,
        ),
    };

    let negotiation_terms = fit_terms(
        b.list("negotiationTerms", &local.negotiation_terms),
        &local.negotiation_terms,
    );

    let lc = &local.conclusion;
    let conclusion = Conclusion {
        project_type: b.text("conclusion.projectType", &lc.project_type),
        overall_rating: b.rating("conclusion.overallRating", lc.overall_rating),
        recommended_action: b.text("conclusion.recommendedAction", &lc.recommended_action),
        biggest_opportunity: b.text("conclusion.biggestOpportunity", &lc.biggest_opportunity),
        biggest_risk: b.text("conclusion.biggestRisk", &lc.biggest_risk),
    };

    let backfilled = b.missing;
    let mut insufficient_info = sentence_list(lookup(value, "insufficientInfo"));
    insufficient_info.extend(backfilled.iter().cloned());

    (
        GovernmentAssessment {
            company_profile,
            landing_assessment,
            industry_match,
            core_value,
            risk_assessment,
            introduction_strategy,
            negotiation_terms,
            conclusion,
            insufficient_info: dedup_preserving_order(insufficient_info),
        },
        backfilled,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::Provider;
    use serde_json::json;

    fn company() -> Company {
        Company {
            name: "深睿影像".to_string(),
            city: "上海".to_string(),
            industry: vec!["AI".to_string(), "医疗健康".to_string()],
            track: "AI医学影像".to_string(),
            last_round: "B轮".to_string(),
            investors: vec!["红杉中国".to_string()],
            growth_stage: "快速增长".to_string(),
            ..Default::default()
        }
    }

    fn full_payload() -> Value {
        let risk = json!({"source": "来源", "localImpact": "影响"});
        json!({
            "companyProfile": {
                "industryStage": "成长期",
                "coreTechnology": "影像算法",
                "developmentStage": "B轮",
                "summary": "总结"
            },
            "landingAssessment": {
                "credibilityLevel": "高可信",
                "strategicAlignment": "一致",
                "irreplaceability": "较强",
                "inputOutputLogic": "合理",
                "keyEvidence": ["三类证"]
            },
            "industryMatch": {
                "matchLevel": "高度匹配",
                "dominantIndustryFit": "契合",
                "chainEffect": "补链",
                "clusterPotential": "较强"
            },
            "coreValue": {"industryValue": "技术", "economicValue": "税收", "strategicValue": "示范"},
            "riskAssessment": {
                "financialRisk": risk,
                "businessRisk": risk,
                "competitionRisk": risk,
                "policyRisk": risk
            },
            "introductionStrategy": {
                "recommendIntroduce": "是",
                "recommendedForm": "区域总部",
                "policyPriority": ["人才"],
                "notRecommendedPolicy": ["现金奖励"]
            },
            "negotiationTerms": ["条款1", "条款2", "条款3", "条款4", "条款5"],
            "conclusion": {
                "projectType": "研发型",
                "overallRating": 4,
                "recommendedAction": "推进",
                "biggestOpportunity": "机会",
                "biggestRisk": "风险"
            },
            "insufficientInfo": []
        })
    }

    fn local() -> GovernmentAssessment {
        generate_local_assessment(&RequirementProfile::default(), &company())
    }

    #[test]
    fn test_complete_payload_needs_no_backfill() {
        let (assessment, backfilled) = assessment_from_value(&full_payload(), &local());
        assert!(backfilled.is_empty(), "unexpected backfill: {backfilled:?}");
        assert!(assessment.insufficient_info.is_empty());
        assert_eq!(assessment.conclusion.overall_rating, 4);
        assert_eq!(assessment.industry_match.match_level, MatchLevel::High);
        assert_eq!(assessment.company_profile.summary, "总结");
    }

    #[test]
    fn test_blank_fields_are_backfilled_and_listed() {
        let mut payload = full_payload();
        payload["riskAssessment"]["policyRisk"]["source"] = json!("");
        payload["coreValue"].as_object_mut().unwrap().remove("economicValue");
        payload["insufficientInfo"] = json!(["企业营收数据"]);

        let local = local();
        let (assessment, backfilled) = assessment_from_value(&payload, &local);
        assert_eq!(
            backfilled,
            vec!["coreValue.economicValue", "riskAssessment.policyRisk.source"]
        );
        assert_eq!(assessment.core_value.economic_value, local.core_value.economic_value);
        assert_eq!(
            assessment.risk_assessment.policy_risk.source,
            local.risk_assessment.policy_risk.source
        );
        assert_eq!(
            assessment.insufficient_info,
            vec![
                "企业营收数据",
                "coreValue.economicValue",
                "riskAssessment.policyRisk.source"
            ]
        );
    }

    #[test]
    fn test_enums_are_coerced_leniently() {
        let mut payload = full_payload();
        payload["landingAssessment"]["credibilityLevel"] = json!("可信度存疑");
        payload["introductionStrategy"]["recommendIntroduce"] = json!("建议谨慎引入");
        payload["industryMatch"]["matchLevel"] = json!("无法判断");

        let (assessment, backfilled) = assessment_from_value(&payload, &local());
        assert_eq!(
            assessment.landing_assessment.credibility_level,
            CredibilityLevel::Doubtful
        );
        assert_eq!(
            assessment.introduction_strategy.recommend_introduce,
            IntroduceRecommendation::Cautious
        );
        assert_eq!(backfilled, vec!["industryMatch.matchLevel"]);
    }

    #[test]
    fn test_rating_is_clamped_and_read_from_text() {
        assert_eq!(read_rating(Some(&json!(9))), Some(5));
        assert_eq!(read_rating(Some(&json!("4星"))), Some(4));
        assert_eq!(read_rating(Some(&json!("★★★☆☆"))), Some(3));
        assert_eq!(read_rating(Some(&json!(0))), None);
        assert_eq!(read_rating(None), None);
    }

    #[test]
    fn test_terms_padded_and_truncated_to_five() {
        let fallback: Vec<String> = (1..=5).map(|i| format!("本地{i}")).collect();
        let padded = fit_terms(vec!["本地2".to_string(), "模型".to_string()], &fallback);
        assert_eq!(padded, vec!["本地2", "模型", "本地1", "本地3", "本地4"]);
        let many: Vec<String> = (1..=7).map(|i| format!("模型{i}")).collect();
        assert_eq!(fit_terms(many, &fallback).len(), NEGOTIATION_TERM_COUNT);
    }

    #[test]
    fn test_snake_case_keys_are_accepted() {
        let payload = json!({"conclusion": {"overall_rating": 2}});
        assert_eq!(
            read_rating(lookup(&payload, "conclusion.overallRating")),
            Some(2)
        );
    }

    #[test]
    fn test_empty_payload_is_entirely_local() {
        let local = local();
        let (assessment, backfilled) = assessment_from_value(&json!({}), &local);
        assert_eq!(assessment.conclusion, local.conclusion);
        assert_eq!(assessment.negotiation_terms, local.negotiation_terms);
        assert!(backfilled.contains(&"negotiationTerms".to_string()));
    }

    #[tokio::test]
    async fn test_unconfigured_client_returns_local_assessment() {
        let llm = LlmClient::new(Provider::Moonshot, None);
        let result = assess_company("上海医疗AI", &RequirementProfile::default(), &company(), &llm).await;
        assert_eq!(result.source, Source::Heuristic);
        assert_eq!(result.assessment, local());
    }

    #[tokio::test]
    async fn test_partial_mocked_assessment_is_merged() {
        let mut server = mockito::Server::new_async().await;
        let mut payload = full_payload();
        payload["companyProfile"]["summary"] = json!("");
        payload["insufficientInfo"] = json!(["营收数据"]);
        let args = payload.to_string();
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(
                json!({"choices": [{"message": {"tool_calls": [{"function": {"arguments": args}}]}}]})
                    .to_string(),
            )
            .create_async()
            .await;
        let llm = LlmClient::new(Provider::Moonshot, Some("k".to_string())).with_base_url(server.url());

        let result = assess_company("上海医疗AI", &RequirementProfile::default(), &company(), &llm).await;
        assert_eq!(result.source, Source::Merged);
        assert_eq!(result.assessment.company_profile.summary, local().company_profile.summary);
        assert_eq!(
            result.assessment.insufficient_info,
            vec!["营收数据", "companyProfile.summary"]
        );
        assert_eq!(result.assessment.conclusion.overall_rating, 4);
    }
}

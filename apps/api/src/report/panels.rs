//! Presentation panels for a government assessment: company basics plus the nine report modules.
//!
//! A panel's tone is read only from the enum behind it (credibility, match
//! level, introduce recommendation, star rating). Free text never changes tone.

use serde::Serialize;

use crate::models::assessment::{
    CredibilityLevel, GovernmentAssessment, IntroduceRecommendation, MatchLevel, RiskItem,
};
use crate::models::company::Company;

pub const MAX_STARS: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Caution,
    Negative,
    Neutral,
}

impl Tone {
    pub fn for_credibility(level: CredibilityLevel) -> Self {
        match level {
            CredibilityLevel::High => Self::Positive,
            CredibilityLevel::Medium => Self::Caution,
            CredibilityLevel::Doubtful => Self::Negative,
        }
    }

    pub fn for_match_level(level: MatchLevel) -> Self {
        match level {
            MatchLevel::High | MatchLevel::Matched => Self::Positive,
            MatchLevel::Moderate => Self::Caution,
            MatchLevel::Mismatched => Self::Negative,
        }
    }

    pub fn for_introduce(recommendation: IntroduceRecommendation) -> Self {
        match recommendation {
            IntroduceRecommendation::Yes => Self::Positive,
            IntroduceRecommendation::Cautious => Self::Caution,
            IntroduceRecommendation::No => Self::Negative,
        }
    }

    pub fn for_rating(rating: u8) -> Self {
        match rating {
            4.. => Self::Positive,
            3 => Self::Caution,
            _ => Self::Negative,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RowValue {
    Text { value: String },
    List { items: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelRow {
    pub label: String,
    #[serde(flatten)]
    pub value: RowValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub key: &'static str,
    pub title: &'static str,
    pub tone: Tone,
    pub rows: Vec<PanelRow>,
}

fn text(label: &str, value: impl Into<String>) -> PanelRow {
    PanelRow {
        label: label.to_string(),
        value: RowValue::Text {
            value: value.into(),
        },
    }
}

fn list(label: &str, items: &[String]) -> PanelRow {
    PanelRow {
        label: label.to_string(),
        value: RowValue::List {
            items: items.to_vec(),
        },
    }
}

fn risk_row(label: &str, risk: &RiskItem) -> PanelRow {
    list(
        label,
        &[
            format!("风险来源：{}", risk.source),
            format!("对地方影响：{}", risk.local_impact),
        ],
    )
}

/// `★★★☆☆` for a 1–5 rating; out-of-range values are clamped.
pub fn stars(rating: u8) -> String {
    let filled = rating.min(MAX_STARS) as usize;
    format!(
        "{}{}",
        "★".repeat(filled),
        "☆".repeat(MAX_STARS as usize - filled)
    )
}

fn basic_info(company: &Company) -> Panel {
    let location = match (company.city.is_empty(), company.province.is_empty()) {
        (false, false) if company.city != company.province => {
            format!("{}，{}", company.city, company.province)
        }
        (false, _) => company.city.clone(),
        (true, _) => company.province.clone(),
    };

    let mut last_round = company.last_round.clone();
    if !company.last_round_date.is_empty() {
        last_round.push_str(&format!("（{}）", company.last_round_date));
    }
    if !company.last_round_amount.is_empty() {
        last_round.push_str(&format!(" {}", company.last_round_amount));
    }

    let register_year = if company.register_year > 0 {
        format!("{}年", company.register_year)
    } else {
        String::new()
    };

    Panel {
        key: "basicInfo",
        title: "企业基本信息",
        tone: Tone::Neutral,
        rows: vec![
            text("企业名称", company.name.clone()),
            text("所在地区", location),
            list("所属行业", &company.industry),
            text("细分赛道", company.track.clone()),
            text("成立年份", register_year),
            text("最近融资", last_round),
            list("投资方", &company.investors),
            text("发展阶段", company.growth_stage.clone()),
        ],
    }
}

pub fn render_panels(company: &Company, assessment: &GovernmentAssessment) -> Vec<Panel> {
    let profile = &assessment.company_profile;
    let landing = &assessment.landing_assessment;
    let industry = &assessment.industry_match;
    let value = &assessment.core_value;
    let risks = &assessment.risk_assessment;
    let strategy = &assessment.introduction_strategy;
    let conclusion = &assessment.conclusion;

    vec![
        basic_info(company),
        Panel {
            key: "companyProfile",
            title: "模块一：企业综合画像",
            tone: Tone::Neutral,
            rows: vec![
                text("所处行业阶段", profile.industry_stage.clone()),
                text("核心竞争点", profile.core_technology.clone()),
                text("当前发展阶段", profile.development_stage.clone()),
                text("综合总结", profile.summary.clone()),
            ],
        },
        Panel {
            key: "landingAssessment",
            title: "模块二：项目真实性与落地判断",
            tone: Tone::for_credibility(landing.credibility_level),
            rows: vec![
                text("可信度", landing.credibility_level.label()),
                text("战略一致性", landing.strategic_alignment.clone()),
                text("不可替代性", landing.irreplaceability.clone()),
                text("投入产出逻辑", landing.input_output_logic.clone()),
                list("关键判断依据", &landing.key_evidence),
            ],
        },
        Panel {
            key: "industryMatch",
            title: "模块三：与地方产业匹配度评估",
            tone: Tone::for_match_level(industry.match_level),
            rows: vec![
                text("匹配程度", industry.match_level.label()),
                text("主导产业契合度", industry.dominant_industry_fit.clone()),
                text("补链/强链/延链", industry.chain_effect.clone()),
                text("集聚示范潜力", industry.cluster_potential.clone()),
            ],
        },
        Panel {
            key: "coreValue",
            title: "模块四：可为地方带来的核心价值",
            tone: Tone::Neutral,
            rows: vec![
                text("产业价值", value.industry_value.clone()),
                text("经济价值", value.economic_value.clone()),
                text("战略价值", value.strategic_value.clone()),
            ],
        },
        Panel {
            key: "riskAssessment",
            title: "模块五：主要风险识别",
            tone: Tone::Neutral,
            rows: vec![
                risk_row("财务风险", &risks.financial_risk),
                risk_row("经营风险", &risks.business_risk),
                risk_row("竞争风险", &risks.competition_risk),
                risk_row("政策风险", &risks.policy_risk),
            ],
        },
        Panel {
            key: "introductionStrategy",
            title: "模块六：政府引入策略建议",
            tone: Tone::for_introduce(strategy.recommend_introduce),
            rows: vec![
                text("是否建议引入", strategy.recommend_introduce.label()),
                text("引入形式", strategy.recommended_form.clone()),
                list("政策支持优先级", &strategy.policy_priority),
                list("不建议给予的政策", &strategy.not_recommended_policy),
            ],
        },
        Panel {
            key: "negotiationTerms",
            title: "模块七：招商谈判关键条款建议",
            tone: Tone::Neutral,
            rows: vec![list("核心条款", &assessment.negotiation_terms)],
        },
        Panel {
            key: "conclusion",
            title: "模块八：综合结论",
            tone: Tone::for_rating(conclusion.overall_rating),
            rows: vec![
                text("项目类型", conclusion.project_type.clone()),
                text("综合评级", stars(conclusion.overall_rating)),
                text("推荐动作", conclusion.recommended_action.clone()),
                text("最大机会点", conclusion.biggest_opportunity.clone()),
                text("最大风险点", conclusion.biggest_risk.clone()),
            ],
        },
        Panel {
            key: "insufficientInfo",
            title: "信息不足标注",
            tone: Tone::Neutral,
            rows: vec![list("需补充信息", &assessment.insufficient_info)],
        },
    ]
}

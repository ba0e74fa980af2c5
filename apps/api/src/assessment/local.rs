//! Canned government assessment built from the company record and the parsed profile.
//!
//! Drivers: growth stage, investor quality, industry family, and whether the
//! company sits in a preferred region / industry. Fields the company record
//! cannot support are listed in `insufficient_info`.

use crate::matching::keywords::{
    has_top_investor, IndustryFamily, GROWTH_EARLY, GROWTH_FAST, GROWTH_MATURE,
};
use crate::matching::scoring::{industry_matches, region_matches};
use crate::models::assessment::{
    CompanyProfile, Conclusion, CoreValue, CredibilityLevel, GovernmentAssessment,
    IndustryMatch, IntroduceRecommendation, IntroductionStrategy, LandingAssessment, MatchLevel,
    RiskAssessment, RiskItem,
};
use crate::models::company::{Company, RequirementProfile};

const BASE_RATING: i32 = 3;

const NEGOTIATION_TERMS: [&str; 5] = [
    "明确落地主体的注册资本及实缴时间表",
    "约定入驻后3年内的产值与税收承诺",
    "设定本地就业人数及研发人员占比要求",
    "政策兑现与阶段性考核指标挂钩，未达标可追回",
    "约定最短经营年限及迁出限制条款",
];

fn family_of(company: &Company) -> Option<IndustryFamily> {
    [
        IndustryFamily::Manufacturing,
        IndustryFamily::LifeScience,
        IndustryFamily::Digital,
    ]
    .into_iter()
    .find(|family| family.covers(&company.industry))
}

fn or_unknown(text: &str, unknown: &str) -> String {
    if text.trim().is_empty() {
        unknown.to_string()
    } else {
        text.to_string()
    }
}

struct Signals {
    family: Option<IndustryFamily>,
    top_investor: bool,
    early: bool,
    growing: bool,
    early_round: bool,
    clinical: bool,
    region_fit: bool,
    industry_fit: bool,
    no_filters: bool,
}

impl Signals {
    fn read(profile: &RequirementProfile, company: &Company) -> Self {
        Self {
            family: family_of(company),
            top_investor: has_top_investor(&company.investors),
            early: company.growth_stage == GROWTH_EARLY,
            growing: company.growth_stage == GROWTH_FAST || company.growth_stage == GROWTH_MATURE,
            early_round: company.last_round.contains("天使") || company.last_round.contains("Pre"),
            clinical: company
                .tags
                .iter()
                .any(|t| t.contains("临床") || t.contains("试验")),
            region_fit: profile
                .region_preference
                .iter()
                .any(|r| region_matches(r, company)),
            industry_fit: profile
                .industry_preference
                .iter()
                .any(|i| industry_matches(i, company)),
            no_filters: profile.region_preference.is_empty()
                && profile.industry_preference.is_empty(),
        }
    }

    fn match_level(&self) -> MatchLevel {
        match (self.no_filters, self.region_fit, self.industry_fit) {
            (true, _, _) => MatchLevel::Moderate,
            (_, true, true) => MatchLevel::High,
            (_, false, true) => MatchLevel::Matched,
            (_, true, false) => MatchLevel::Moderate,
            (_, false, false) => MatchLevel::Mismatched,
        }
    }

    fn credibility(&self) -> CredibilityLevel {
        if self.top_investor && !self.early {
            CredibilityLevel::High
        } else if self.early && !self.top_investor {
            CredibilityLevel::Doubtful
        } else {
            CredibilityLevel::Medium
        }
    }
}

fn company_profile(company: &Company) -> CompanyProfile {
    let track = or_unknown(&company.track, "所属");
    let industry_stage = match company.growth_stage.as_str() {
        GROWTH_EARLY => format!("{track}赛道处于技术验证与早期商业化阶段"),
        GROWTH_FAST => format!("{track}赛道处于快速成长期，市场需求持续释放"),
        GROWTH_MATURE => format!("{track}赛道已进入规模化发展阶段"),
        _ => format!("{track}赛道发展阶段有待进一步核实"),
    };

    let core_technology = if company.business_summary.trim().is_empty() {
        format!("聚焦{track}方向，核心技术细节需进一步尽调核实")
    } else {
        company.business_summary.clone()
    };

    let development_stage = format!(
        "{}{}，{}",
        or_unknown(&company.last_round, "融资轮次未披露"),
        if company.last_round_date.is_empty() {
            String::new()
        } else {
            format!("（{}）", company.last_round_date)
        },
        or_unknown(&company.growth_stage, "发展阶段未披露")
    );

    let mut summary = company.name.clone();
    if company.register_year > 0 {
        summary.push_str(&format!("成立于{}年，", company.register_year));
    } else {
        summary.push('，');
    }
    if !company.city.is_empty() {
        summary.push_str(&format!("总部位于{}，", company.city));
    }
    summary.push_str(&format!("主营{track}。"));
    if !company.last_round.is_empty() {
        summary.push_str(&format!(
            "最近一轮融资为{}{}",
            company.last_round,
            if company.last_round_amount.is_empty() {
                String::new()
            } else {
                format!("（{}）", company.last_round_amount)
            }
        ));
        if !company.investors.is_empty() {
            summary.push_str(&format!("，投资方包括{}", company.investors.join("、")));
        }
        summary.push('。');
    }
    if !company.headline.is_empty() {
        summary.push_str(&company.headline);
    }

    CompanyProfile {
        industry_stage,
        core_technology,
        development_stage,
        summary,
    }
}

fn landing_assessment(company: &Company, signals: &Signals) -> LandingAssessment {
    let strategic_alignment = if signals.region_fit {
        "企业现有布局与本地区域定位一致，落地具备战略合理性"
    } else {
        "企业总部不在目标区域，需核实异地设立分支机构的战略动因"
    };

    let irreplaceability = if company.tags.is_empty() {
        "差异化能力需结合技术尽调进一步判断".to_string()
    } else {
        format!("具备{}等差异化能力，短期内可替代性较低", company.tags.join("、"))
    };

    let input_output_logic = match signals.family {
        Some(IndustryFamily::Manufacturing) => "以生产基地投入换取产值与就业，需关注固定资产投资强度",
        Some(IndustryFamily::LifeScience) => "研发投入周期长，需以阶段性里程碑约束投入产出",
        Some(IndustryFamily::Digital) => "轻资产运营，投入以办公与人才为主，产出体现为税收与高端就业",
        None => "需企业提供投资计划以评估投入产出",
    };

    let mut key_evidence = Vec::new();
    if !company.last_round.is_empty() {
        key_evidence.push(format!(
            "最近融资：{}{}",
            company.last_round,
            if company.last_round_date.is_empty() {
                String::new()
            } else {
                format!("（{}）", company.last_round_date)
            }
        ));
    }
    if !company.investors.is_empty() {
        key_evidence.push(format!("投资方：{}", company.investors.join("、")));
    }
    if !company.growth_stage.is_empty() {
        key_evidence.push(format!("发展阶段：{}", company.growth_stage));
    }
    if !company.news_snippet.is_empty() {
        key_evidence.push(format!("近期动态：{}", company.news_snippet));
    }

    LandingAssessment {
        credibility_level: signals.credibility(),
        strategic_alignment: strategic_alignment.to_string(),
        irreplaceability,
        input_output_logic: input_output_logic.to_string(),
        key_evidence,
    }
}

fn industry_match(company: &Company, signals: &Signals) -> IndustryMatch {
    let industries = or_unknown(&company.industry.join("、"), "所属行业");
    let dominant_industry_fit = if signals.industry_fit {
        format!("企业所属{industries}与本地区招商主导方向契合")
    } else {
        format!("企业所属{industries}与本地区招商主导方向关联度有限")
    };

    let chain_effect = match signals.family {
        Some(IndustryFamily::Manufacturing) => "可补齐本地制造环节，带动上下游配套企业集聚",
        Some(IndustryFamily::LifeScience) => "可强化本地研发与临床转化环节，起到强链作用",
        Some(IndustryFamily::Digital) => "可为本地传统产业提供数字化赋能，起到延链作用",
        None => "补链强链作用需结合本地产业图谱进一步评估",
    };

    let cluster_potential = if signals.growing && signals.top_investor {
        "具备示范引领效应，有望吸引同赛道企业集聚"
    } else {
        "集聚效应有限，可作为本地产业生态的补充"
    };

    IndustryMatch {
        match_level: signals.match_level(),
        dominant_industry_fit,
        chain_effect: chain_effect.to_string(),
        cluster_potential: cluster_potential.to_string(),
    }
}

fn core_value(company: &Company, signals: &Signals) -> CoreValue {
    let track = or_unknown(&company.track, "所属");
    let industry_value = if signals.top_investor {
        format!("在{track}领域具备技术积累，并获头部投资机构认可")
    } else {
        format!("在{track}领域具备一定技术积累")
    };

    let economic_value = match company.growth_stage.as_str() {
        GROWTH_MATURE => "营收规模稳定，短期内可贡献税收与产值",
        GROWTH_FAST => "处于扩张期，未来3年有望形成税收与就业增量",
        GROWTH_EARLY => "短期经济贡献有限，价值主要体现在未来成长性",
        _ => "经济贡献需企业提供经营数据后测算",
    };

    CoreValue {
        industry_value,
        economic_value: economic_value.to_string(),
        strategic_value: format!("可提升本地区在{track}领域的产业能级与对外合作影响力"),
    }
}

fn risk(source: &str, local_impact: &str) -> RiskItem {
    RiskItem {
        source: source.to_string(),
        local_impact: local_impact.to_string(),
    }
}

fn risk_assessment(company: &Company, signals: &Signals) -> RiskAssessment {
    let financial_risk = if signals.early || signals.early_round {
        risk(
            "融资轮次较早，现金流依赖外部融资",
            "若后续融资不及预期，项目可能停滞，地方前期投入面临损失",
        )
    } else {
        risk("估值与融资节奏需持续关注", "对地方扶持资金的兑现节奏影响有限")
    };

    let business_risk = if signals.clinical {
        risk("产品处于研发/试验阶段，商业化周期较长", "产值与税收贡献的兑现周期较长")
    } else if signals.early {
        risk("商业模式尚未完全验证", "落地后的产值规模存在较大不确定性")
    } else {
        risk("需关注市场拓展与订单落地情况", "产值贡献可能低于预期")
    };

    let track = or_unknown(&company.track, "所属");
    let competition_risk = RiskItem {
        source: format!("{track}赛道竞争加剧，头部企业集中度提升"),
        local_impact: "若企业竞争力下滑，对本地产业的带动效应将减弱".to_string(),
    };

    let policy_source = match signals.family {
        Some(IndustryFamily::LifeScience) => "医药审批与行业监管政策变化",
        Some(IndustryFamily::Manufacturing) => "产业补贴与环保要求调整",
        Some(IndustryFamily::Digital) => "数据安全与平台监管政策变化",
        None => "行业政策变化",
    };

    RiskAssessment {
        financial_risk,
        business_risk,
        competition_risk,
        policy_risk: risk(policy_source, "政策调整可能影响企业在本地的业务布局"),
    }
}

fn introduction_strategy(
    signals: &Signals,
    credibility: CredibilityLevel,
    level: MatchLevel,
) -> IntroductionStrategy {
    let recommend_introduce = match (credibility, level) {
        (CredibilityLevel::Doubtful, MatchLevel::Mismatched) => IntroduceRecommendation::No,
        (CredibilityLevel::High, l) if l != MatchLevel::Mismatched => IntroduceRecommendation::Yes,
        _ => IntroduceRecommendation::Cautious,
    };

    let (recommended_form, policy_priority): (&str, &[&str]) = match signals.family {
        Some(IndustryFamily::Manufacturing) => (
            "设立生产基地或区域制造中心",
            &["厂房租金补贴", "设备投资补助", "人才公寓保障"],
        ),
        Some(IndustryFamily::LifeScience) => (
            "设立研发中心或临床转化基地",
            &["实验室建设补贴", "临床试验配套支持", "人才引进补贴"],
        ),
        Some(IndustryFamily::Digital) => (
            "设立区域总部或研发中心",
            &["办公场地租金减免", "人才引进补贴", "应用场景开放"],
        ),
        None => ("先以办事处形式落地，逐步扩大投入", &["场地租金补贴", "人才引进补贴"]),
    };

    let not_recommended: &[&str] = if signals.early {
        &["大额股权直投", "无对赌条件的一次性现金奖励"]
    } else {
        &["无产出约束的土地优惠", "一次性大额现金奖励"]
    };

    IntroductionStrategy {
        recommend_introduce,
        recommended_form: recommended_form.to_string(),
        policy_priority: policy_priority.iter().map(|s| s.to_string()).collect(),
        not_recommended_policy: not_recommended.iter().map(|s| s.to_string()).collect(),
    }
}

fn overall_rating(signals: &Signals, level: MatchLevel) -> u8 {
    let mut rating = BASE_RATING;
    if signals.top_investor {
        rating += 1;
    }
    if signals.growing {
        rating += 1;
    }
    if signals.early {
        rating -= 1;
    }
    match level {
        MatchLevel::High => rating += 1,
        MatchLevel::Mismatched => rating -= 1,
        _ => {}
    }
    rating.clamp(1, 5) as u8
}

fn conclusion(
    company: &Company,
    signals: &Signals,
    strategy: &IntroductionStrategy,
    risks: &RiskAssessment,
    level: MatchLevel,
) -> Conclusion {
    let project_type = match signals.family {
        Some(IndustryFamily::Manufacturing) => "制造业落地项目",
        Some(IndustryFamily::LifeScience) => "研发型项目",
        Some(IndustryFamily::Digital) => "总部/研发型项目",
        None => "综合型项目",
    };

    let recommended_action = match strategy.recommend_introduce {
        IntroduceRecommendation::Yes => "建议列入重点招商名单，尽快启动对接洽谈",
        IntroduceRecommendation::Cautious => "建议持续跟踪，补充尽调信息后再做决策",
        IntroduceRecommendation::No => "暂不建议引入，保持信息跟踪",
    };

    let track = or_unknown(&company.track, "所属");
    let biggest_opportunity = if signals.top_investor {
        format!("借助头部资本背书与{track}赛道成长红利，形成产业集聚")
    } else {
        format!("把握{track}赛道发展机遇，完善本地产业生态")
    };

    let biggest_risk = if signals.early || signals.early_round {
        risks.financial_risk.source.clone()
    } else {
        risks.business_risk.source.clone()
    };

    Conclusion {
        project_type: project_type.to_string(),
        overall_rating: overall_rating(signals, level),
        recommended_action: recommended_action.to_string(),
        biggest_opportunity,
        biggest_risk,
    }
}

pub(crate) fn default_negotiation_terms() -> Vec<String> {
    NEGOTIATION_TERMS.iter().map(|s| s.to_string()).collect()
}

pub fn generate_local_assessment(
    profile: &RequirementProfile,
    company: &Company,
) -> GovernmentAssessment {
    let signals = Signals::read(profile, company);

    let landing_assessment = landing_assessment(company, &signals);
    let industry_match = industry_match(company, &signals);
    let risk_assessment = risk_assessment(company, &signals);
    let introduction_strategy = introduction_strategy(
        &signals,
        landing_assessment.credibility_level,
        industry_match.match_level,
    );
    let conclusion = conclusion(
        company,
        &signals,
        &introduction_strategy,
        &risk_assessment,
        industry_match.match_level,
    );

    let mut insufficient_info = Vec::new();
    if company.business_summary.trim().is_empty() {
        insufficient_info.push("companyProfile.coreTechnology".to_string());
    }
    if company.tags.is_empty() {
        insufficient_info.push("landingAssessment.irreplaceability".to_string());
    }
    if company.investors.is_empty() {
        insufficient_info.push("landingAssessment.keyEvidence".to_string());
    }
    if company.growth_stage.trim().is_empty() {
        insufficient_info.push("coreValue.economicValue".to_string());
    }
    if signals.family.is_none() {
        insufficient_info.push("introductionStrategy.recommendedForm".to_string());
    }

    GovernmentAssessment {
        company_profile: company_profile(company),
        landing_assessment,
        industry_match,
        core_value: core_value(company, &signals),
        risk_assessment,
        introduction_strategy,
        negotiation_terms: default_negotiation_terms(),
        conclusion,
        insufficient_info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assessment::NEGOTIATION_TERM_COUNT;

    fn robot_company() -> Company {
        Company {
            id: "c002".to_string(),
            name: "苏州灵动机器人".to_string(),
            city: "苏州".to_string(),
            province: "江苏".to_string(),
            industry: vec!["机器人".to_string(), "智能制造".to_string()],
            track: "协作机器人".to_string(),
            register_year: 2018,
            last_round: "C轮".to_string(),
            last_round_date: "2023-11".to_string(),
            investors: vec!["高瓴创投".to_string()],
            business_summary: "协作机器人本体与控制器研发".to_string(),
            growth_stage: GROWTH_FAST.to_string(),
            tags: vec!["量产交付".to_string()],
            ..Default::default()
        }
    }

    fn profile(regions: &[&str], industries: &[&str]) -> RequirementProfile {
        RequirementProfile {
            region_preference: regions.iter().map(|s| s.to_string()).collect(),
            industry_preference: industries.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_strong_fit_recommends_introduction() {
        let assessment = generate_local_assessment(&profile(&["苏州"], &["机器人"]), &robot_company());
        assert_eq!(assessment.landing_assessment.credibility_level, CredibilityLevel::High);
        assert_eq!(assessment.industry_match.match_level, MatchLevel::High);
        assert_eq!(
            assessment.introduction_strategy.recommend_introduce,
            IntroduceRecommendation::Yes
        );
        // 3 + top investor + growing + high match
        assert_eq!(assessment.conclusion.overall_rating, 5);
        assert_eq!(assessment.conclusion.project_type, "制造业落地项目");
        assert!(assessment.insufficient_info.is_empty());
    }

    #[test]
    fn test_early_company_outside_profile_is_not_recommended() {
        let company = Company {
            name: "武汉光量子".to_string(),
            city: "武汉".to_string(),
            industry: vec!["量子".to_string()],
            track: "量子计算".to_string(),
            last_round: "Pre-A轮".to_string(),
            growth_stage: GROWTH_EARLY.to_string(),
            ..Default::default()
        };
        let assessment = generate_local_assessment(&profile(&["上海"], &["机器人"]), &company);
        assert_eq!(assessment.landing_assessment.credibility_level, CredibilityLevel::Doubtful);
        assert_eq!(assessment.industry_match.match_level, MatchLevel::Mismatched);
        assert_eq!(
            assessment.introduction_strategy.recommend_introduce,
            IntroduceRecommendation::No
        );
        // 3 - early - mismatched
        assert_eq!(assessment.conclusion.overall_rating, 1);
        assert_eq!(
            assessment.conclusion.biggest_risk,
            "融资轮次较早，现金流依赖外部融资"
        );
        assert!(assessment
            .insufficient_info
            .contains(&"companyProfile.coreTechnology".to_string()));
        assert!(assessment
            .insufficient_info
            .contains(&"introductionStrategy.recommendedForm".to_string()));
    }

    #[test]
    fn test_empty_profile_is_moderate_match() {
        let assessment = generate_local_assessment(&RequirementProfile::default(), &robot_company());
        assert_eq!(assessment.industry_match.match_level, MatchLevel::Moderate);
        assert_eq!(assessment.conclusion.overall_rating, 5);
    }

    #[test]
    fn test_always_five_terms_and_full_text() {
        let assessment = generate_local_assessment(&RequirementProfile::default(), &Company::default());
        assert_eq!(assessment.negotiation_terms.len(), NEGOTIATION_TERM_COUNT);
        assert!(!assessment.company_profile.summary.is_empty());
        assert!(!assessment.risk_assessment.policy_risk.source.is_empty());
        assert!((1..=5).contains(&assessment.conclusion.overall_rating));
    }

    #[test]
    fn test_clinical_tag_drives_business_risk() {
        let company = Company {
            industry: vec!["生物医药".to_string()],
            tags: vec!["临床II期".to_string()],
            growth_stage: GROWTH_FAST.to_string(),
            ..Default::default()
        };
        let assessment = generate_local_assessment(&RequirementProfile::default(), &company);
        assert_eq!(
            assessment.risk_assessment.business_risk.source,
            "产品处于研发/试验阶段，商业化周期较长"
        );
        assert_eq!(assessment.introduction_strategy.recommended_form, "设立研发中心或临床转化基地");
    }
}

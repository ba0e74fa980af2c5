//! Government investment-attraction assessment report (政府招商评估报告).
//! Wire names are camelCase; enum values are the Chinese labels shown to users.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredibilityLevel {
    #[serde(rename = "高可信")]
    High,
    #[default]
    #[serde(rename = "中等可信")]
    Medium,
    #[serde(rename = "存疑")]
    Doubtful,
}

impl CredibilityLevel {
    pub fn from_loose(text: &str) -> Option<Self> {
        if text.contains("存疑") || text.contains("低") {
            Some(Self::Doubtful)
        } else if text.contains("中") {
            Some(Self::Medium)
        } else if text.contains("高") {
            Some(Self::High)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "高可信",
            Self::Medium => "中等可信",
            Self::Doubtful => "存疑",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchLevel {
    #[serde(rename = "高度匹配")]
    High,
    #[serde(rename = "匹配")]
    Matched,
    #[default]
    #[serde(rename = "一般")]
    Moderate,
    #[serde(rename = "不匹配")]
    Mismatched,
}

impl MatchLevel {
    pub fn from_loose(text: &str) -> Option<Self> {
        if text.contains("不匹配") {
            Some(Self::Mismatched)
        } else if text.contains("高度") {
            Some(Self::High)
        } else if text.contains("一般") || text.contains("中") {
            Some(Self::Moderate)
        } else if text.contains("匹配") {
            Some(Self::Matched)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "高度匹配",
            Self::Matched => "匹配",
            Self::Moderate => "一般",
            Self::Mismatched => "不匹配",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntroduceRecommendation {
    #[serde(rename = "是")]
    Yes,
    #[default]
    #[serde(rename = "谨慎")]
    Cautious,
    #[serde(rename = "不建议")]
    No,
}

impl IntroduceRecommendation {
    pub fn from_loose(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.contains("不建议") || text.contains("否") || text.contains("不推荐") {
            Some(Self::No)
        } else if text.contains("谨慎") {
            Some(Self::Cautious)
        } else if text.starts_with('是') || text.contains("建议引入") || text.contains("推荐") {
            Some(Self::Yes)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Yes => "是",
            Self::Cautious => "谨慎",
            Self::No => "不建议",
        }
    }
}

/// 模块一：企业综合画像
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyProfile {
    pub industry_stage: String,
    pub core_technology: String,
    pub development_stage: String,
    pub summary: String,
}

/// 模块二：项目真实性与落地判断
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LandingAssessment {
    pub credibility_level: CredibilityLevel,
    pub strategic_alignment: String,
    pub irreplaceability: String,
    pub input_output_logic: String,
    pub key_evidence: Vec<String>,
}

/// 模块三：与地方产业匹配度评估
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndustryMatch {
    pub match_level: MatchLevel,
    pub dominant_industry_fit: String,
    pub chain_effect: String,
    pub cluster_potential: String,
}

/// 模块四：可为地方带来的核心价值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoreValue {
    pub industry_value: String,
    pub economic_value: String,
    pub strategic_value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RiskItem {
    pub source: String,
    pub local_impact: String,
}

/// 模块五：主要风险识别
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RiskAssessment {
    pub financial_risk: RiskItem,
    pub business_risk: RiskItem,
    pub competition_risk: RiskItem,
    pub policy_risk: RiskItem,
}

/// 模块六：政府引入策略建议
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntroductionStrategy {
    pub recommend_introduce: IntroduceRecommendation,
    pub recommended_form: String,
    pub policy_priority: Vec<String>,
    pub not_recommended_policy: Vec<String>,
}

/// 模块八：综合结论
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Conclusion {
    pub project_type: String,
    /// 1 – 5 stars
    pub overall_rating: u8,
    pub recommended_action: String,
    pub biggest_opportunity: String,
    pub biggest_risk: String,
}

/// Number of negotiation terms a complete report carries (模块七).
pub const NEGOTIATION_TERM_COUNT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GovernmentAssessment {
    pub company_profile: CompanyProfile,
    pub landing_assessment: LandingAssessment,
    pub industry_match: IndustryMatch,
    pub core_value: CoreValue,
    pub risk_assessment: RiskAssessment,
    pub introduction_strategy: IntroductionStrategy,
    pub negotiation_terms: Vec<String>,
    pub conclusion: Conclusion,
    /// Dotted paths of fields that lacked information.
    pub insufficient_info: Vec<String>,
}

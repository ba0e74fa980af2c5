use serde::{Deserialize, Serialize};

use crate::models::Source;

/// A candidate company, either from the embedded catalog or generated by the LLM.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub city: String,
    pub province: String,
    pub industry: Vec<String>,
    pub track: String,
    pub register_year: i32,
    pub last_round: String,
    /// `YYYY-MM` or `YYYY-MM-DD`.
    pub last_round_date: String,
    pub last_round_amount: String,
    pub investors: Vec<String>,
    pub headline: String,
    pub business_summary: String,
    pub news_snippet: String,
    /// 早期 | 快速增长 | 成熟期 (free text from the LLM path)
    pub growth_stage: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_news_text: Option<String>,
}

impl Company {
    /// Year of the last financing round, read from the leading digits of the date.
    pub fn last_round_year(&self) -> Option<i32> {
        let digits: String = self
            .last_round_date
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if digits.len() == 4 {
            digits.parse().ok()
        } else {
            None
        }
    }
}

/// Structured filters extracted from a free-text requirement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequirementProfile {
    pub region_preference: Vec<String>,
    pub industry_preference: Vec<String>,
    pub stage_preference: Vec<String>,
    pub time_window: String,
    pub extra_preferences: Vec<String>,
    pub scenario: String,
}

impl RequirementProfile {
    pub fn is_empty(&self) -> bool {
        self.region_preference.is_empty()
            && self.industry_preference.is_empty()
            && self.stage_preference.is_empty()
            && self.extra_preferences.is_empty()
            && self.time_window.trim().is_empty()
            && self.scenario.trim().is_empty()
    }

    /// True when none of the three filtering criteria is set.
    pub fn has_no_core_filters(&self) -> bool {
        self.region_preference.is_empty()
            && self.industry_preference.is_empty()
            && self.stage_preference.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedCompany {
    pub company_id: String,
    /// 0 – 100
    pub match_score: u32,
    pub match_reason: String,
    pub company: Company,
    pub source: Source,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[default]
    #[serde(rename = "推荐")]
    Recommended,
    #[serde(rename = "谨慎推荐")]
    Cautious,
    #[serde(rename = "不推荐")]
    NotRecommended,
}

impl Recommendation {
    /// Reads any phrasing that carries one of the three verdicts.
    pub fn from_loose(text: &str) -> Option<Self> {
        if text.contains("不推荐") || text.contains("不建议") {
            Some(Self::NotRecommended)
        } else if text.contains("谨慎") {
            Some(Self::Cautious)
        } else if text.contains("推荐") {
            Some(Self::Recommended)
        } else {
            None
        }
    }
}

/// Short investment-attraction analysis of one company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyAnalysis {
    pub match_points: Vec<String>,
    pub risks: Vec<String>,
    pub suitable_venue: String,
    pub recommendation: Recommendation,
    pub recommendation_reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_deserializes_with_missing_fields() {
        let company: Company = serde_json::from_str(r#"{"id":"c1","name":"测试科技"}"#).unwrap();
        assert_eq!(company.name, "测试科技");
        assert!(company.industry.is_empty());
        assert_eq!(company.register_year, 0);
    }

    #[test]
    fn test_last_round_year() {
        let mut company = Company {
            last_round_date: "2024-03".to_string(),
            ..Default::default()
        };
        assert_eq!(company.last_round_year(), Some(2024));
        company.last_round_date = "近期".to_string();
        assert_eq!(company.last_round_year(), None);
    }

    #[test]
    fn test_profile_emptiness() {
        let mut profile = RequirementProfile::default();
        assert!(profile.is_empty());
        assert!(profile.has_no_core_filters());
        profile.scenario = "产业园".to_string();
        assert!(!profile.is_empty());
        assert!(profile.has_no_core_filters());
    }

    #[test]
    fn test_recommendation_serializes_as_chinese() {
        let json = serde_json::to_string(&Recommendation::Cautious).unwrap();
        assert_eq!(json, "\"谨慎推荐\"");
    }

    #[test]
    fn test_recommendation_from_loose() {
        assert_eq!(
            Recommendation::from_loose("建议：不推荐引入"),
            Some(Recommendation::NotRecommended)
        );
        assert_eq!(
            Recommendation::from_loose("谨慎推荐"),
            Some(Recommendation::Cautious)
        );
        assert_eq!(
            Recommendation::from_loose("强烈推荐"),
            Some(Recommendation::Recommended)
        );
        assert_eq!(Recommendation::from_loose("待定"), None);
    }

    #[test]
    fn test_analysis_uses_camel_case() {
        let value = serde_json::to_value(CompanyAnalysis::default()).unwrap();
        assert!(value.get("matchPoints").is_some());
        assert!(value.get("recommendationReason").is_some());
    }
}

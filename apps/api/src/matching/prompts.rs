// Prompt constants and tool schemas for the matching flow.
// Reuses cross-cutting fragments from llm_client::prompts.

use serde_json::json;

use crate::llm_client::ToolSpec;

pub const REQUIREMENT_ROLE: &str = "你是招商助手，负责阅读用户的一段招商需求文本，提取出结构化筛选条件。";

/// Replace `{requirement_text}` before sending.
pub const REQUIREMENT_PROMPT_TEMPLATE: &str = r#"【用户需求】：
{requirement_text}

请抽取：
- region_preference：地域/城市/区域关键词列表
- industry_preference：行业/赛道关键词列表
- stage_preference：融资轮次（如：天使轮、A轮、B轮等）
- time_window：如果提到最近几年/某个时间段，请解析为描述字符串
- extra_preferences：其它偏好（如是否有头部基金、是否已商业化、是否团队在扩张等）
- scenario：适配场景（如：产业园、总部办公、实验室、制造工厂等的推理）"#;

pub const SEARCH_ROLE: &str = "你是招商企业检索引擎，熟悉中国创投市场，根据招商需求画像推荐真实存在的候选企业。";

/// Replace `{profile_json}` and `{count}` before sending.
pub const SEARCH_PROMPT_TEMPLATE: &str = r#"【用户需求画像】：
{profile_json}

请推荐{count}家最符合该画像的企业，每家企业需给出城市、省份、行业标签、细分赛道、成立年份、最近融资轮次/日期/金额、投资方、一句话标题、业务简介、近期动态、发展阶段（早期/快速增长/成熟期）以及特色标签。"#;

pub const MATCH_ROLE: &str = "你是招商匹配引擎，根据用户需求画像和候选企业列表，为每家企业打一个0-100的匹配分数，并给出一行中文理由。";

/// Replace `{profile_json}` and `{candidates_json}` before sending.
pub const MATCH_PROMPT_TEMPLATE: &str = r#"【用户需求画像】：
{profile_json}

【候选企业列表】（JSON数组，每条包含：id/name/city/industry/track/last_round/last_round_date/investors/business_summary等字段）：
{candidates_json}

请为每家候选企业返回 company_id（使用候选列表中的 id）、score 和 reason。"#;

pub const ANALYSIS_ROLE: &str = "你是招商顾问，根据用户需求与公司信息，用简短中文给出招商视角的分析。";

/// Replace `{requirement_text}` and `{company_json}` before sending.
pub const ANALYSIS_PROMPT_TEMPLATE: &str = r#"【用户需求】：
{requirement_text}

【公司信息】：
{company_json}

请回答：
1. 这家公司与用户需求的匹配点（2-3条）
2. 主要风险或不确定性（1-2条）
3. 适合什么样的园区或载体（写一句话）
4. 最终建议：推荐 / 谨慎推荐 / 不推荐（并用一句话说明原因）"#;

pub fn parse_requirement_tool() -> ToolSpec {
    ToolSpec {
        name: "parse_requirement",
        description: "从用户需求文本中提取结构化的招商需求信息",
        parameters: json!({
            "type": "object",
            "properties": {
                "region_preference": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "地区偏好，如北京、上海、长三角等"
                },
                "industry_preference": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "行业偏好，如人工智能、新能源、半导体等"
                },
                "stage_preference": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "融资阶段偏好，如A轮、B轮、C轮等"
                },
                "time_window": { "type": "string", "description": "时间窗口要求" },
                "extra_preferences": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "其他偏好，如头部投资机构背书、团队扩张等"
                },
                "scenario": { "type": "string", "description": "适用场景" }
            },
            "required": ["region_preference", "industry_preference", "stage_preference"]
        }),
    }
}

pub fn search_companies_tool() -> ToolSpec {
    let string = json!({ "type": "string" });
    let string_list = json!({ "type": "array", "items": { "type": "string" } });
    ToolSpec {
        name: "search_companies",
        description: "根据招商需求画像返回候选企业列表",
        parameters: json!({
            "type": "object",
            "properties": {
                "companies": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": string,
                            "city": string,
                            "province": string,
                            "industry": string_list,
                            "track": string,
                            "register_year": { "type": "integer" },
                            "last_round": string,
                            "last_round_date": { "type": "string", "description": "YYYY-MM" },
                            "last_round_amount": string,
                            "investors": string_list,
                            "headline": string,
                            "business_summary": string,
                            "news_snippet": string,
                            "growth_stage": { "type": "string", "enum": ["早期", "快速增长", "成熟期"] },
                            "tags": string_list
                        },
                        "required": ["name", "city", "industry", "track", "last_round"]
                    }
                }
            },
            "required": ["companies"]
        }),
    }
}

pub fn match_companies_tool() -> ToolSpec {
    ToolSpec {
        name: "match_companies",
        description: "根据用户需求匹配公司并返回匹配分数和原因",
        parameters: json!({
            "type": "object",
            "properties": {
                "matches": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "company_id": { "type": "string" },
                            "score": { "type": "number", "description": "匹配分数 0-100" },
                            "reason": { "type": "string", "description": "匹配原因" }
                        },
                        "required": ["company_id", "score", "reason"]
                    }
                }
            },
            "required": ["matches"]
        }),
    }
}

pub fn analyze_company_tool() -> ToolSpec {
    ToolSpec {
        name: "analyze_company",
        description: "分析公司与用户需求的匹配度，提供投资建议",
        parameters: json!({
            "type": "object",
            "properties": {
                "alignment_rationale": { "type": "string", "description": "匹配度分析" },
                "risks": { "type": "array", "items": { "type": "string" }, "description": "潜在风险" },
                "venue_recommendation": { "type": "string", "description": "适用场景建议" },
                "recommendation": {
                    "type": "string",
                    "enum": ["推荐", "谨慎推荐", "不推荐"],
                    "description": "最终建议"
                },
                "recommendation_rationale": { "type": "string", "description": "建议理由" }
            },
            "required": [
                "alignment_rationale",
                "risks",
                "venue_recommendation",
                "recommendation",
                "recommendation_rationale"
            ]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_required_fields_are_declared_properties() {
        for tool in [
            parse_requirement_tool(),
            search_companies_tool(),
            match_companies_tool(),
            analyze_company_tool(),
        ] {
            let required = tool.parameters["required"].as_array().unwrap();
            for key in required {
                let key = key.as_str().unwrap();
                assert!(
                    tool.parameters["properties"].get(key).is_some(),
                    "{} declares required '{}' without a property",
                    tool.name,
                    key
                );
            }
        }
    }

    #[test]
    fn test_templates_carry_placeholders() {
        assert!(REQUIREMENT_PROMPT_TEMPLATE.contains("{requirement_text}"));
        assert!(MATCH_PROMPT_TEMPLATE.contains("{candidates_json}"));
        assert!(ANALYSIS_PROMPT_TEMPLATE.contains("{company_json}"));
        assert!(SEARCH_PROMPT_TEMPLATE.contains("{count}"));
    }
}

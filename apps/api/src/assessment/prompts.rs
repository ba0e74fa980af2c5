// Prompt constants and the tool schema for the government assessment report.

use serde_json::{json, Value};

use crate::llm_client::ToolSpec;
use crate::models::assessment::NEGOTIATION_TERM_COUNT;

pub const ASSESSMENT_ROLE: &str = "你是服务地方政府的资深招商评估专家，站在政府视角评估企业的引入价值、落地可信度与风险，\
    输出结构化的《政府招商评估报告》。";

/// Replace `{requirement_text}` and `{company_json}` before sending.
pub const ASSESSMENT_PROMPT_TEMPLATE: &str = r#"【招商需求】：
{requirement_text}

【企业信息】：
{company_json}

请按以下八个模块完成评估：
一、企业综合画像（行业阶段、核心技术、发展阶段、300字以内总结）
二、项目真实性与落地判断（可信度：高可信/中等可信/存疑，并说明战略一致性、不可替代性、投入产出逻辑和关键依据）
三、与地方产业匹配度（高度匹配/匹配/一般/不匹配，以及主导产业契合度、补链强链延链作用、集聚潜力）
四、可为地方带来的核心价值（产业、经济、战略）
五、主要风险识别（财务、经营、竞争、政策，每项给出风险来源和对地方的影响）
六、政府引入策略建议（是否建议引入：是/谨慎/不建议，引入形式、政策支持优先级、不建议给予的政策）
七、招商谈判关键条款（恰好5条）
八、综合结论（项目类型、1-5星评级、推荐动作、最大机会点、最大风险点）

无法判断的字段请在 insufficientInfo 中列出字段路径。"#;

fn text(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn text_list(description: &str) -> Value {
    json!({ "type": "array", "items": { "type": "string" }, "description": description })
}

fn object(properties: Value) -> Value {
    let required: Vec<String> = properties
        .as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default();
    json!({ "type": "object", "properties": properties, "required": required })
}

fn risk(description: &str) -> Value {
    let mut schema = object(json!({
        "source": text("风险来源"),
        "localImpact": text("对地方的影响"),
    }));
    schema["description"] = json!(description);
    schema
}

pub fn government_assessment_tool() -> ToolSpec {
    ToolSpec {
        name: "government_assessment",
        description: "站在地方政府视角输出结构化的企业招商评估报告",
        parameters: json!({
            "type": "object",
            "properties": {
                "companyProfile": object(json!({
                    "industryStage": text("所处行业阶段"),
                    "coreTechnology": text("技术/产品核心竞争点"),
                    "developmentStage": text("当前发展阶段"),
                    "summary": text("300字以内总结"),
                })),
                "landingAssessment": object(json!({
                    "credibilityLevel": { "type": "string", "enum": ["高可信", "中等可信", "存疑"] },
                    "strategicAlignment": text("与企业战略一致性"),
                    "irreplaceability": text("不可替代性分析"),
                    "inputOutputLogic": text("投入产出逻辑"),
                    "keyEvidence": text_list("关键判断依据"),
                })),
                "industryMatch": object(json!({
                    "matchLevel": { "type": "string", "enum": ["高度匹配", "匹配", "一般", "不匹配"] },
                    "dominantIndustryFit": text("与区域主导产业契合度"),
                    "chainEffect": text("补链/强链/延链作用"),
                    "clusterPotential": text("产业集聚或示范效应潜力"),
                })),
                "coreValue": object(json!({
                    "industryValue": text("产业价值（技术、品牌、链主效应）"),
                    "economicValue": text("经济价值（税收、产值、就业）"),
                    "strategicValue": text("战略价值（示范、对外合作、区域能级）"),
                })),
                "riskAssessment": object(json!({
                    "financialRisk": risk("财务风险"),
                    "businessRisk": risk("经营风险"),
                    "competitionRisk": risk("竞争风险"),
                    "policyRisk": risk("政策风险"),
                })),
                "introductionStrategy": object(json!({
                    "recommendIntroduce": { "type": "string", "enum": ["是", "谨慎", "不建议"] },
                    "recommendedForm": text("引入形式"),
                    "policyPriority": text_list("政策支持优先级"),
                    "notRecommendedPolicy": text_list("不建议给予的政策"),
                })),
                "negotiationTerms": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": NEGOTIATION_TERM_COUNT,
                    "maxItems": NEGOTIATION_TERM_COUNT,
                    "description": "招商谈判关键条款"
                },
                "conclusion": object(json!({
                    "projectType": text("项目类型"),
                    "overallRating": { "type": "integer", "minimum": 1, "maximum": 5, "description": "1-5星" },
                    "recommendedAction": text("推荐动作"),
                    "biggestOpportunity": text("最大机会点"),
                    "biggestRisk": text("最大风险点"),
                })),
                "insufficientInfo": text_list("需补充信息的字段路径"),
            },
            "required": [
                "companyProfile",
                "landingAssessment",
                "industryMatch",
                "coreValue",
                "riskAssessment",
                "introductionStrategy",
                "negotiationTerms",
                "conclusion"
            ]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_objects_require_all_properties() {
        let tool = government_assessment_tool();
        let risk = &tool.parameters["properties"]["riskAssessment"]["properties"]["policyRisk"];
        assert_eq!(risk["required"].as_array().unwrap().len(), 2);
        assert_eq!(risk["description"], "政策风险");
        let conclusion = &tool.parameters["properties"]["conclusion"];
        assert_eq!(conclusion["required"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn test_terms_are_pinned_to_five() {
        let tool = government_assessment_tool();
        let terms = &tool.parameters["properties"]["negotiationTerms"];
        assert_eq!(terms["minItems"], 5);
        assert_eq!(terms["maxItems"], 5);
    }
}

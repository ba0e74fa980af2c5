// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments only.

/// Appended to every system prompt that is paired with a forced tool call.
pub const TOOL_ONLY_INSTRUCTION: &str = "请严格通过给定的函数返回结果，\
    只填写函数参数要求的字段，不要输出任何额外的解释文字。";

/// Reminder that company data must not be presented as verified fact.
pub const NO_FABRICATION_INSTRUCTION: &str = "如果信息不足，请如实说明“信息不足”，\
    不要编造融资金额、投资方或经营数据。";

/// Builds a system prompt from a role description plus the shared fragments.
pub fn system_prompt(role: &str) -> String {
    format!("{role}\n\n{TOOL_ONLY_INSTRUCTION}\n{NO_FABRICATION_INSTRUCTION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_includes_fragments() {
        let prompt = system_prompt("你是招商助手。");
        assert!(prompt.starts_with("你是招商助手。"));
        assert!(prompt.contains(TOOL_ONLY_INSTRUCTION));
        assert!(prompt.contains(NO_FABRICATION_INSTRUCTION));
    }
}

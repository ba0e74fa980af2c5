//! Markdown export of an assessment report, built from the same panels the UI renders.

use crate::models::assessment::GovernmentAssessment;
use crate::models::company::Company;
use crate::report::panels::{render_panels, RowValue};

const EMPTY_VALUE: &str = "暂无";

pub fn render_markdown(company: &Company, assessment: &GovernmentAssessment) -> String {
    let title = if company.name.trim().is_empty() {
        "企业".to_string()
    } else {
        company.name.clone()
    };
    let mut out = format!("# {title} 政府招商评估报告\n");

    for panel in render_panels(company, assessment) {
        out.push_str(&format!("\n## {}\n\n", panel.title));
        for row in &panel.rows {
            match &row.value {
                RowValue::Text { value } => {
                    let value = if value.trim().is_empty() {
                        EMPTY_VALUE
                    } else {
                        value.as_str()
                    };
                    out.push_str(&format!("- **{}**：{}\n", row.label, value));
                }
                RowValue::List { items } if items.is_empty() => {
                    out.push_str(&format!("- **{}**：{}\n", row.label, EMPTY_VALUE));
                }
                RowValue::List { items } => {
                    out.push_str(&format!("- **{}**：\n", row.label));
                    for item in items {
                        out.push_str(&format!("  - {item}\n"));
                    }
                }
            }
        }
    }

    out
}

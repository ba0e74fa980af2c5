// Report rendering: pure presentation of a GovernmentAssessment.
// No LLM calls and no state; the assessment handlers call into this.

pub mod markdown;
pub mod panels;

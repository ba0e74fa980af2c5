// Government assessment report: LLM generation with per-field local backfill.
// Rendering lives in crate::report.

pub mod assessor;
pub mod handlers;
pub mod local;
pub mod prompts;

pub mod assessment;
pub mod company;
pub mod news;

use serde::{Deserialize, Serialize};

/// Where a result came from. Returned to clients so they can tell a model
/// answer from a locally computed fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Entirely from the LLM.
    Llm,
    /// LLM output with blanks filled from the local heuristics.
    Merged,
    /// Entirely from the local heuristics.
    Heuristic,
}

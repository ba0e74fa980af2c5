// Daily financing news: LLM fetch, persistence, and the static fallback list.

pub mod fallback;
pub mod fetcher;
pub mod handlers;
pub mod prompts;
pub mod refresh;
pub mod store;

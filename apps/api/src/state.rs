use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::matching::catalog::CompanyCatalog;
use crate::matching::scoring::CompanyScorer;
use crate::news::fetcher::NewsFetcher;
use crate::news::store::NewsStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Moonshot client for parsing, search, matching, analysis and assessment.
    pub llm: LlmClient,
    /// Tuzi-backed news fetcher.
    pub news: NewsFetcher,
    pub news_store: Arc<dyn NewsStore>,
    pub catalog: Arc<CompanyCatalog>,
    /// Pluggable match scorer. LlmCompanyScorer unless ENABLE_LLM_MATCHING=false.
    pub scorer: Arc<dyn CompanyScorer>,
    pub config: Config,
}

#[cfg(test)]
impl AppState {
    /// State with unconfigured LLM clients, the keyword scorer and an in-memory news store.
    pub fn offline() -> Self {
        use crate::llm_client::Provider;
        use crate::matching::scoring::KeywordCompanyScorer;
        use crate::news::store::MemoryNewsStore;

        let catalog = CompanyCatalog::load_embedded().expect("embedded catalog parses");
        AppState {
            llm: LlmClient::new(Provider::Moonshot, None),
            news: NewsFetcher::new(LlmClient::new(Provider::Tuzi, None)),
            news_store: Arc::new(MemoryNewsStore::new()),
            catalog: Arc::new(catalog),
            scorer: Arc::new(KeywordCompanyScorer),
            config: Config::offline(),
        }
    }
}

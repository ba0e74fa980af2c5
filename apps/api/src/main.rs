mod assessment;
mod config;
mod db;
mod errors;
mod llm_client;
mod matching;
mod models;
mod news;
mod normalize;
mod report;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::{LlmClient, Provider};
use crate::matching::catalog::CompanyCatalog;
use crate::matching::scoring::{CompanyScorer, KeywordCompanyScorer, LlmCompanyScorer};
use crate::news::fetcher::NewsFetcher;
use crate::news::store::{MemoryNewsStore, NewsStore, PgNewsStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Zhaoshang API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM clients
    let llm = LlmClient::new(Provider::Moonshot, config.kimi_api_key.clone())
        .with_base_url(&config.kimi_base_url);
    let news_llm = LlmClient::new(Provider::Tuzi, config.tuzi_api_key.clone())
        .with_base_url(&config.tuzi_base_url);
    for client in [&llm, &news_llm] {
        let provider = client.provider();
        if client.is_configured() {
            info!("LLM client initialized ({provider:?}, model: {})", provider.model());
        } else {
            warn!(
                "{}_API_KEY not set, {provider:?} calls will use local fallbacks",
                provider.key_name()
            );
        }
    }

    // News store: Postgres when configured, in-memory otherwise
    let news_store: Arc<dyn NewsStore> = match &config.database_url {
        Some(url) => Arc::new(PgNewsStore::new(create_pool(url).await?)),
        None => {
            warn!("DATABASE_URL not set, news is cached in memory only");
            Arc::new(MemoryNewsStore::new())
        }
    };
    info!("News store: {}", news_store.backend());

    let catalog = CompanyCatalog::load_embedded()?;
    info!("Company catalog loaded: {} companies", catalog.all().len());

    // Match scorer (LlmCompanyScorer by default, swap via ENABLE_LLM_MATCHING)
    let scorer: Arc<dyn CompanyScorer> = if config.enable_llm_matching {
        Arc::new(LlmCompanyScorer { llm: llm.clone() })
    } else {
        Arc::new(KeywordCompanyScorer)
    };
    info!("Match scorer: {}", scorer.backend());

    // Build app state
    let state = AppState {
        llm,
        news: NewsFetcher::new(news_llm),
        news_store,
        catalog: Arc::new(catalog),
        scorer,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

mod analysis;
mod config;
mod db;
mod errors;
mod history;
mod llm_client;
mod models;
mod routes;
mod schema;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::flows::AnalysisFlows;
use crate::config::Config;
use crate::db::create_pool;
use crate::history::feed::{ChangeFeed, LocalChangeFeed, RedisChangeFeed};
use crate::history::gateway::PersistenceGateway;
use crate::history::store::PgHistoryStore;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::schema::SchemaRegistry;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TalentTrace API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Change feed: Redis pub/sub when configured, in-process otherwise
    let feed: Arc<dyn ChangeFeed> = match &config.redis_url {
        Some(url) => Arc::new(RedisChangeFeed::connect(url).await?),
        None => {
            info!("REDIS_URL not set; using in-process change feed");
            Arc::new(LocalChangeFeed::new())
        }
    };

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone(), config.llm_max_attempts)?;
    info!(
        "LLM client initialized (model: {}, attempts: {})",
        llm_client::MODEL,
        config.llm_max_attempts
    );

    let registry = Arc::new(SchemaRegistry::builtin());
    let flows = AnalysisFlows::new(Arc::new(llm), registry, config.flow_timeout);
    info!(
        "Analysis flows ready: {}, {}, {} (timeout {:?})",
        flows.job_match.name(),
        flows.ats_score.name(),
        flows.optimize.name(),
        config.flow_timeout
    );
    let history = PersistenceGateway::new(Arc::new(PgHistoryStore::new(db)), feed, config.subscription_ttl);

    let state = AppState {
        flows: Arc::new(flows),
        history: Arc::new(history),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

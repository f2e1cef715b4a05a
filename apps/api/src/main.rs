mod candidates;
mod config;
mod db;
mod errors;
mod import;
mod ingestion;
mod llm_client;
mod models;
mod routes;
mod state;
mod views;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::ingestion::analyzer::LlmCvAnalyzer;
use crate::ingestion::extractor::PdfTextExtractor;
use crate::ingestion::job_requirements::FileJobRequirements;
use crate::ingestion::scorer::LlmCandidateScorer;
use crate::ingestion::uploads::UploadArea;
use crate::ingestion::Collaborators;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing or malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TalentScreen v{}", env!("CARGO_PKG_VERSION"));

    // Initialize SQLite
    let db = create_pool(&config.database_url).await?;

    // Upload area
    let uploads = UploadArea::init(&config.upload_dir)
        .await
        .with_context(|| format!("Cannot create upload directory {}", config.upload_dir.display()))?;

    // Initialize LLM client
    let llm = LlmClient::new(
        config.anthropic_api_key.clone(),
        Duration::from_secs(config.llm_timeout_secs),
        config.llm_max_attempts,
    )?;
    info!(
        "LLM client initialized (model: {}, attempts: {})",
        llm_client::MODEL,
        config.llm_max_attempts
    );

    let collaborators = Collaborators {
        extractor: Arc::new(PdfTextExtractor),
        analyzer: Arc::new(LlmCvAnalyzer(llm.clone())),
        scorer: Arc::new(LlmCandidateScorer(llm)),
        requirements: Arc::new(FileJobRequirements {
            path: config.job_description_path.clone(),
        }),
    };
    info!(
        "Scoring against {} (CSV import policy: {})",
        config.job_description_path.display(),
        config.import_policy
    );

    // Build app state
    let state = AppState {
        db,
        config: config.clone(),
        collaborators,
        uploads,
    };

    // Build router
    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

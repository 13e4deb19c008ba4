mod config;
mod errors;
mod interview;
mod llm_client;
mod routes;
mod state;
mod tasks;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::interview::selection::SeededPicker;
use crate::interview::session::spawn_idle_sweeper;
use crate::interview::{
    LlmEvaluator, LlmReportSynthesizer, Orchestrator, OrchestratorConfig, SessionStore,
};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::tasks::{CsvDatasetStore, TaskCatalog};

/// How often idle interviews are looked for.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting interviewer v{}", env!("CARGO_PKG_VERSION"));

    // One LLM client for the whole process, shared by evaluator and synthesizer
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let catalog = Arc::new(TaskCatalog::builtin());
    info!("Task catalog loaded with {} tasks", catalog.len());

    let datasets = CsvDatasetStore::new(&config.dataset_dir)?;
    info!("Datasets written to {}", config.dataset_dir.display());

    let mut orchestrator = Orchestrator::new(
        catalog,
        Arc::new(LlmEvaluator::new(llm.clone())),
        Arc::new(LlmReportSynthesizer::new(llm)),
        Arc::new(datasets),
        OrchestratorConfig {
            task_count: config.task_count,
        },
    );
    if let Some(seed) = config.task_seed {
        info!("Task selection seeded with {seed}");
        orchestrator = orchestrator.with_picker(Arc::new(SeededPicker::new(seed)));
    }
    info!("Interviews run {} tasks each", orchestrator.task_count());

    let state = AppState {
        orchestrator: Arc::new(orchestrator),
        sessions: Arc::new(SessionStore::new()),
    };

    spawn_idle_sweeper(
        state.sessions.clone(),
        state.orchestrator.clone(),
        chrono::Duration::minutes(config.session_idle_minutes),
        SWEEP_INTERVAL,
    );
    info!(
        "Idle interviews evicted after {} minutes",
        config.session_idle_minutes
    );

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

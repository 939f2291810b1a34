//! Dreamnet API server entry point.

use std::error::Error;
use std::sync::{Arc, Mutex};

use dreamnet_api::config::AppConfig;
use dreamnet_api::error::AppError;
use dreamnet_api::state::AppState;
use dreamnet_catalog::domain::catalog::QuestCatalog;
use dreamnet_core::event::{Clock, SystemClock};
use dreamnet_core::narrative::NarrativeGenerationService;
use dreamnet_core::rng::{DeterministicRng, SystemRng};
use dreamnet_core::role::Role;
use dreamnet_narrator::GeminiNarrator;
use dreamnet_session::application::orchestrator::OrchestratorServices;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env file is fine; real deployments set the environment.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Dreamnet API server");

    let config = AppConfig::from_env()?;
    let catalog = load_catalog(&config)?;
    tracing::info!(
        warden = catalog.pool(Role::Warden).len(),
        scholar = catalog.pool(Role::Scholar).len(),
        model = %config.gemini.model,
        max_sessions = config.max_sessions,
        "Challenge catalog loaded"
    );

    let narrator: Arc<dyn NarrativeGenerationService> =
        Arc::new(GeminiNarrator::new(config.gemini.clone()));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> =
        Arc::new(Mutex::new(SystemRng::from_entropy()));

    let app_state = AppState::new(OrchestratorServices {
        catalog: Arc::new(catalog),
        narrator,
        clock,
        rng,
        request_timeout: config.request_timeout,
    })
    .with_session_limit(config.max_sessions);
    let app = dreamnet_api::app(app_state);

    tracing::info!("Listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .map_err(AppError::Server)?;

    axum::serve(listener, app).await.map_err(AppError::Server)?;

    Ok(())
}

fn load_catalog(config: &AppConfig) -> Result<QuestCatalog, AppError> {
    let Some(path) = &config.catalog_path else {
        return Ok(QuestCatalog::builtin());
    };
    let source = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;
    QuestCatalog::from_yaml(&source)
        .map_err(|e| AppError::Config(format!("invalid catalog {}: {e}", path.display())))
}

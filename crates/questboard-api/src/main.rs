//! Questboard API server entry point.

use std::sync::{Arc, Mutex};

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use questboard_api::config::AppConfig;
use questboard_api::error::AppError;
use questboard_api::state::AppState;
use questboard_api::{build_router, telemetry};
use questboard_core::clock::{Clock, SystemClock};
use questboard_core::participant::ParticipantDirectory;
use questboard_core::repository::EventRepository;
use questboard_core::rng::{DeterministicRng, StdDeterministicRng};
use questboard_notifier::NotificationHub;
use questboard_storage::schema::ensure_schema;
use questboard_storage::{
    DirectorySeed, InMemoryEventRepository, InMemoryParticipantDirectory, PgEventRepository,
    PgParticipantDirectory,
};

type Adapters = (Arc<dyn EventRepository>, Arc<dyn ParticipantDirectory>);

async fn postgres_adapters(config: &AppConfig, database_url: &str) -> Result<Adapters, AppError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(database_url)
        .await?;
    ensure_schema(&pool).await?;
    info!(
        max_connections = config.database_max_connections,
        "connected to PostgreSQL"
    );
    Ok((
        Arc::new(PgEventRepository::new(pool.clone())),
        Arc::new(PgParticipantDirectory::new(pool)),
    ))
}

async fn in_memory_adapters(config: &AppConfig) -> Result<Adapters, AppError> {
    warn!("DATABASE_URL not set; interactions are kept in memory and lost on restart");
    let directory = match &config.directory_seed_file {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
                AppError::Config(format!("cannot read {}: {e}", path.display()))
            })?;
            let seed: DirectorySeed = serde_json::from_str(&raw).map_err(|e| {
                AppError::Config(format!("invalid directory seed {}: {e}", path.display()))
            })?;
            info!(campaigns = seed.campaigns.len(), "participant directory seeded");
            InMemoryParticipantDirectory::from_seed(&seed)
        }
        None => InMemoryParticipantDirectory::default(),
    };
    Ok((Arc::new(InMemoryEventRepository::new()), Arc::new(directory)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let telemetry = telemetry::init(&config)?;

    info!(
        exporting_spans = telemetry.is_exporting(),
        "Starting Questboard API server"
    );

    let (event_repository, directory) = match config.database_url.as_deref() {
        Some(database_url) => postgres_adapters(&config, database_url).await?,
        None => in_memory_adapters(&config).await?,
    };

    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(SystemClock);
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> =
        Arc::new(Mutex::new(StdDeterministicRng::from_entropy()));
    let notifications = Arc::new(NotificationHub::new(config.notification_buffer));
    let app_state = AppState::new(clock, rng, event_repository, directory, notifications);

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = build_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.socket_addr()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    telemetry.shutdown();
    Ok(())
}

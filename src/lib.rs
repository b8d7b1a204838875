pub mod api;
pub mod authorization;
pub mod config;
pub mod core_state;
pub mod db;
pub mod history;
pub mod models;
pub mod queue;
pub mod timestamp;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::api::ServerError;
use crate::config::{ConfigError, ServiceConfig};
use crate::db::DatabaseError;
use crate::history::{ClinicSource, SqliteSource};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Cannot open clinic database: {0}")]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error("Cannot listen for shutdown signal: {0}")]
    Signal(std::io::Error),
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the
/// default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Open the store, serve the API and block until Ctrl-C.
pub async fn run(config: ServiceConfig) -> Result<(), StartupError> {
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    tracing::info!(path = %config.database_path.display(), "Opening clinic database");

    let source: Arc<dyn ClinicSource> = Arc::new(SqliteSource::open(&config.database_path)?);
    let core = Arc::new(core_state::CoreState::new(source));

    let server = api::start_server(core, config.bind_addr).await?;

    tokio::signal::ctrl_c().await.map_err(StartupError::Signal)?;
    tracing::info!("Shutdown requested");
    server.stop().await;

    Ok(())
}

//! Backend entry-point: loads configuration, connects to PostgreSQL, ensures
//! the schema, and serves the REST API.

mod server;

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use users_api::config::AppConfig;
use users_api::inbound::http::health::HealthState;
use users_api::outbound::persistence::{
    DbPool, PoolConfig, PoolError, SchemaError, ensure_schema,
};

/// Failures that stop the process before it starts serving.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("failed to connect to database: {0}")]
    Database(#[from] PoolError),
    #[error("failed to create schema: {0}")]
    Schema(#[from] SchemaError),
}

impl From<StartupError> for std::io::Error {
    fn from(err: StartupError) -> Self {
        std::io::Error::other(err.to_string())
    }
}

/// `RUST_LOG` wins when set; otherwise `LOG_LEVEL`, falling back to `info`.
fn log_filter(config: &AppConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level()))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

async fn connect(config: &AppConfig) -> Result<DbPool, StartupError> {
    let pool = DbPool::connect(PoolConfig::new(config.database_url())).await?;
    ensure_schema(&pool).await?;
    Ok(pool)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::load();

    if let Err(e) = fmt().with_env_filter(log_filter(&config)).json().try_init() {
        warn!(error = %e, "tracing init failed");
    }

    info!(
        environment = config.environment(),
        port = config.port(),
        "starting users API"
    );

    let pool = connect(&config).await?;
    let server_config = ServerConfig::new(config, pool);
    let bind_addr = server_config.bind_addr();

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), server_config)?;
    let result = server.await;

    health_state.mark_unhealthy();
    info!(%bind_addr, "server stopped");
    result
}

//! Health endpoints: database health, configuration echo, and liveness and
//! readiness probes for orchestration and load balancers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use actix_web::{HttpResponse, http::header, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::AppConfig;
use crate::domain::ports::ConnectivityProbe;
use crate::inbound::http::state::HttpState;

/// Service version reported by `GET /health`.
pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Upper bound on the database ping behind `GET /health`, well under the
/// pool checkout timeout.
pub const HEALTH_PING_TIMEOUT: Duration = Duration::from_secs(2);

/// Shared health state for readiness and liveness checks.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    /// Create a new health state starting as not ready but live.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the service as ready.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Flag the service as unhealthy so liveness checks fail fast during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// When false, liveness probes emit 503 to trigger restarts.
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn probe_response(probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };

        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always `ok` while the process can answer.
    #[schema(example = "ok")]
    pub status: String,
    /// `ok`, or `error: <reason>` when the database ping fails.
    #[schema(example = "ok")]
    pub database: String,
    #[schema(example = "1.0.0")]
    pub version: String,
}

/// Body of `GET /health/config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ConfigResponse {
    /// Listening port rendered as a string.
    #[schema(example = "8080")]
    pub port: String,
    #[schema(example = "development")]
    pub environment: String,
    #[schema(example = "http://localhost:3000")]
    pub frontend_url: String,
    #[schema(example = "info")]
    pub log_level: String,
}

async fn ping_within(probe: &dyn ConnectivityProbe, limit: Duration) -> Result<(), String> {
    match tokio::time::timeout(limit, probe.ping()).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(err.to_string()),
        Err(_) => Err(format!(
            "database ping timed out after {}ms",
            limit.as_millis()
        )),
    }
}

/// Report process and database health.
///
/// Answers 503 when the database ping fails; `status` stays `ok` because the
/// process itself is still serving.
#[utoipa::path(
    get,
    path = "/health",
    tags = ["health"],
    responses(
        (status = 200, description = "Service and database are healthy", body = HealthResponse),
        (status = 503, description = "Database is unreachable", body = HealthResponse)
    )
)]
pub async fn health(state: web::Data<HttpState>) -> HttpResponse {
    let (mut response, database) = match ping_within(&*state.probe, HEALTH_PING_TIMEOUT).await {
        Ok(()) => (HttpResponse::Ok(), "ok".to_owned()),
        Err(err) => {
            tracing::warn!(error = %err, "health check database ping failed");
            (HttpResponse::ServiceUnavailable(), format!("error: {err}"))
        }
    };

    response.json(HealthResponse {
        status: "ok".to_owned(),
        database,
        version: SERVICE_VERSION.to_owned(),
    })
}

/// Echo the non-secret configuration values for debugging.
#[utoipa::path(
    get,
    path = "/health/config",
    tags = ["health"],
    responses((status = 200, description = "Effective configuration", body = ConfigResponse))
)]
pub async fn health_config(config: web::Data<AppConfig>) -> web::Json<ConfigResponse> {
    web::Json(ConfigResponse {
        port: config.port().to_string(),
        environment: config.environment().to_owned(),
        frontend_url: config.frontend_url().to_owned(),
        log_level: config.log_level().to_owned(),
    })
}

/// Readiness probe. Return 200 when the server is bound and can handle
/// traffic; return 503 otherwise.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is not ready")
    )
)]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_ready())
}

/// Liveness probe. Return 200 while the process is marked alive and 503 once
/// draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_alive())
}

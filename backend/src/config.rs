//! Process configuration.
//!
//! Values come from the process environment, then an optional `.env` file in
//! the working directory, then hard-coded defaults. Empty values count as
//! unset. Loading never fails: an unreadable `.env` or an unparsable `PORT`
//! is logged and the next source wins.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;

use mockable::{DefaultEnv, Env};
use tracing::warn;

const PORT_ENV: &str = "PORT";
const DATABASE_URL_ENV: &str = "DATABASE_URL";
const ENVIRONMENT_ENV: &str = "ENVIRONMENT";
const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
const FRONTEND_URL_ENV: &str = "FRONTEND_URL";

/// Port used when `PORT` is unset or invalid.
pub const DEFAULT_PORT: u16 = 8080;
const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const PRODUCTION: &str = "production";

/// Default location of the optional override file.
pub const ENV_FILE: &str = ".env";

/// Immutable service configuration, built once at startup.
///
/// # Examples
/// ```
/// use std::collections::HashMap;
/// use mockable::MockEnv;
/// use users_api::config::AppConfig;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "PORT" => Some("9090".to_owned()),
///     _ => None,
/// });
/// let config = AppConfig::from_sources(&env, &HashMap::new());
/// assert_eq!(config.port(), 9090);
/// assert_eq!(config.environment(), "development");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    port: u16,
    database_url: String,
    environment: String,
    log_level: String,
    frontend_url: String,
}

impl AppConfig {
    /// Load from the process environment and `./.env`.
    pub fn load() -> Self {
        let file_values = read_env_file(Path::new(ENV_FILE));
        Self::from_sources(&DefaultEnv::new(), &file_values)
    }

    /// Resolve every key from `env`, then `file_values`, then the default.
    pub fn from_sources<E: Env>(env: &E, file_values: &HashMap<String, String>) -> Self {
        let lookup = |name: &str| -> Option<String> {
            env.string(name)
                .filter(|value| !value.is_empty())
                .or_else(|| {
                    file_values
                        .get(name)
                        .filter(|value| !value.is_empty())
                        .cloned()
                })
        };

        let port = match lookup(PORT_ENV) {
            None => DEFAULT_PORT,
            Some(raw) => raw.trim().parse::<u16>().unwrap_or_else(|_| {
                warn!(value = %raw, default = DEFAULT_PORT, "invalid PORT, using default");
                DEFAULT_PORT
            }),
        };

        Self {
            port,
            database_url: lookup(DATABASE_URL_ENV).unwrap_or_default(),
            environment: lookup(ENVIRONMENT_ENV).unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_owned()),
            log_level: lookup(LOG_LEVEL_ENV).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned()),
            frontend_url: lookup(FRONTEND_URL_ENV)
                .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_owned()),
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Connection string; empty when not configured.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// The single origin allowed by CORS.
    pub fn frontend_url(&self) -> &str {
        &self.frontend_url
    }

    /// Exact, case-sensitive match on `production`.
    pub fn is_production(&self) -> bool {
        self.environment == PRODUCTION
    }

    /// Listen on all interfaces at the configured port.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

/// Read `KEY=value` pairs from `path` without touching the process
/// environment.
///
/// A missing file yields an empty map silently; any other failure is logged
/// at `warn` and also yields an empty map.
pub fn read_env_file(path: &Path) -> HashMap<String, String> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(err) if err.not_found() => return HashMap::new(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable env file");
            return HashMap::new();
        }
    };

    match iter.collect::<Result<HashMap<_, _>, _>>() {
        Ok(values) => values,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring malformed env file");
            HashMap::new()
        }
    }
}

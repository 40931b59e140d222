//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use users_api::config::AppConfig;
use users_api::outbound::persistence::DbPool;

/// Everything [`super::create_server`] needs to serve traffic.
pub struct ServerConfig {
    pub(crate) app: AppConfig,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
}

impl ServerConfig {
    /// Bind to the address derived from `app` and serve from `db_pool`.
    #[must_use]
    pub fn new(app: AppConfig, db_pool: DbPool) -> Self {
        Self {
            bind_addr: app.bind_addr(),
            app,
            db_pool,
        }
    }

    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

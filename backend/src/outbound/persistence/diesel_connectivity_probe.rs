//! PostgreSQL-backed `ConnectivityProbe` using the shared Diesel pool.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::QueryableByName;
use diesel::sql_types::Timestamptz;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{ConnectivityError, ConnectivityProbe};

use super::pool::{DbPool, PoolError};

#[derive(Debug, QueryableByName)]
struct ServerTime {
    #[diesel(sql_type = Timestamptz)]
    now: DateTime<Utc>,
}

/// Diesel-backed implementation of the `ConnectivityProbe` port.
#[derive(Clone)]
pub struct DieselConnectivityProbe {
    pool: DbPool,
}

impl DieselConnectivityProbe {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ConnectivityError {
    match error {
        PoolError::Ping { message } => ConnectivityError::query(message),
        other => ConnectivityError::connection(other.message()),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> ConnectivityError {
    debug!(error = %error, "database probe failed");
    ConnectivityError::query(error.to_string())
}

#[async_trait]
impl ConnectivityProbe for DieselConnectivityProbe {
    async fn ping(&self) -> Result<(), ConnectivityError> {
        self.pool.ping().await.map_err(map_pool_error)
    }

    async fn current_time(&self) -> Result<DateTime<Utc>, ConnectivityError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: ServerTime = diesel::sql_query("SELECT NOW() AS now")
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(row.now)
    }
}

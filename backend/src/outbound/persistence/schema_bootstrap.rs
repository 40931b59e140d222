//! Idempotent creation of the `users` table at startup.

use diesel_async::SimpleAsyncConnection;
use tracing::info;

use super::pool::DbPool;

/// DDL for the users table. Safe to run on every start.
pub const CREATE_USERS_TABLE_SQL: &str = "\
CREATE TABLE IF NOT EXISTS users (
    id SERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) UNIQUE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)";

/// Errors raised while bootstrapping the schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("schema bootstrap could not obtain a connection: {message}")]
    Connection { message: String },
    #[error("schema bootstrap statement failed: {message}")]
    Execute { message: String },
}

/// Create the `users` table when it does not exist yet.
///
/// An existing table is left untouched.
pub async fn ensure_schema(pool: &DbPool) -> Result<(), SchemaError> {
    let mut conn = pool.get().await.map_err(|err| SchemaError::Connection {
        message: err.message().to_owned(),
    })?;
    conn.batch_execute(CREATE_USERS_TABLE_SQL)
        .await
        .map_err(|err| SchemaError::Execute {
            message: err.to_string(),
        })?;
    info!("users table ready");
    Ok(())
}

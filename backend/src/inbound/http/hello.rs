//! Hello endpoint proving the HTTP to database round trip.

use actix_web::web;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

const HELLO_MESSAGE: &str = "Full stack integration successful! Frontend <-> Rust <-> PostgreSQL";
const DATABASE_LABEL: &str = "Connected to PostgreSQL";
const SERVER_LABEL: &str = "Rust backend (actix-web)";

/// Body of `GET /api/hello`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HelloResponse {
    pub message: String,
    /// Current time as reported by the database server.
    pub timestamp: DateTime<Utc>,
    pub database: String,
    pub server: String,
}

/// Greet the caller with the database clock.
///
/// A failed round trip carries "Database connection failed" into the error
/// log; clients see the redacted internal error body.
#[utoipa::path(
    get,
    path = "/api/hello",
    tags = ["hello"],
    responses(
        (status = 200, description = "Database round trip succeeded", body = HelloResponse),
        (status = 500, description = "Database round trip failed", body = Error)
    )
)]
pub async fn hello(state: web::Data<HttpState>) -> ApiResult<web::Json<HelloResponse>> {
    let timestamp = state.probe.current_time().await.map_err(|err| {
        tracing::warn!(error = %err, "hello database round trip failed");
        Error::internal("Database connection failed")
    })?;

    Ok(web::Json(HelloResponse {
        message: HELLO_MESSAGE.to_owned(),
        timestamp,
        database: DATABASE_LABEL.to_owned(),
        server: SERVER_LABEL.to_owned(),
    }))
}

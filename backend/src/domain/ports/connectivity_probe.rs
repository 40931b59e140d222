//! Port for checking that the backing database answers queries.
//!
//! Health reporting and the hello endpoint only need a liveness round trip
//! and the database clock, not the user table, so they depend on this narrow
//! port instead of [`super::UserRepository`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::define_port_error;

define_port_error! {
    /// Errors raised while probing the database.
    pub enum ConnectivityError {
        /// A pooled connection could not be obtained.
        Connection { message: String } => "database connection failed: {message}",
        /// The probe query failed.
        Query { message: String } => "database probe failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Run a trivial round trip against the database.
    async fn ping(&self) -> Result<(), ConnectivityError>;

    /// Read the current time from the database server.
    async fn current_time(&self) -> Result<DateTime<Utc>, ConnectivityError>;
}

/// Probe that always succeeds and reports the local clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureConnectivityProbe;

#[async_trait]
impl ConnectivityProbe for FixtureConnectivityProbe {
    async fn ping(&self) -> Result<(), ConnectivityError> {
        Ok(())
    }

    async fn current_time(&self) -> Result<DateTime<Utc>, ConnectivityError> {
        Ok(Utc::now())
    }
}

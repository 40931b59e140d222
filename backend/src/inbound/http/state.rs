//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{ConnectivityProbe, UserRepository};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserRepository>,
    pub probe: Arc<dyn ConnectivityProbe>,
}

impl HttpState {
    /// Bundle the port implementations used by the handlers.
    pub fn new(users: Arc<dyn UserRepository>, probe: Arc<dyn ConnectivityProbe>) -> Self {
        Self { users, probe }
    }
}

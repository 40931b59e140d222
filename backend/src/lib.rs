//! Users API library: domain, adapters, middleware and configuration.
//!
//! The binary in `main.rs` wires these together; integration tests and the
//! `openapi-dump` tool use them directly.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;

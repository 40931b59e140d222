//! Domain primitives and ports.
//!
//! Purpose: define the user record, its validated write input, the
//! transport-agnostic error payload, and the ports that persistence adapters
//! implement. Nothing in this module knows about HTTP or SQL.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - User / UserDraft / UserId — the persisted user and its write input.
//! - TraceId — request-scoped correlation identifier.

pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::error::{Error, ErrorCode};
pub use self::trace_id::TraceId;
pub use self::user::{InvalidUserId, User, UserDraft, UserId, UserValidationError};

/// HTTP header name used to propagate trace identifiers.
pub const TRACE_ID_HEADER: &str = "trace-id";

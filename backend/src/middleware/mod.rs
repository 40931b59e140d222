//! Request middleware.
//!
//! Registered on the `App` in this order, outermost first: [`Trace`],
//! [`SecurityHeaders`], [`Cors`], [`RequestValidation`]. A middleware that
//! answers a request itself (HTTPS redirect, CORS preflight, validation
//! rejection) never invokes the ones inside it.

pub mod cors;
pub mod request_validation;
pub mod security_headers;
pub mod trace;

pub use cors::Cors;
pub use request_validation::{MAX_BODY_BYTES, RequestValidation};
pub use security_headers::SecurityHeaders;
pub use trace::Trace;

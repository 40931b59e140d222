//! Request shape checks applied before routing.
//!
//! - A declared `Content-Length` above [`MAX_BODY_BYTES`] is rejected with 413.
//!   Bodies without a declared length are capped by the payload extractor
//!   configured with the same limit.
//! - `POST` and `PUT` requests whose `Content-Type` is present, non-empty and
//!   not exactly `application/json` are rejected with 415.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::Method;
use actix_web::http::header;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::domain::Error as ApiError;

/// Largest accepted request body in bytes.
pub const MAX_BODY_BYTES: usize = 1_048_576;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Middleware factory enforcing body size and content type.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestValidation;

impl<S, B> Transform<S, ServiceRequest> for RequestValidation
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestValidationMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestValidationMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// Service wrapper produced by [`RequestValidation`].
pub struct RequestValidationMiddleware<S> {
    service: Rc<S>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    TooLarge,
    UnsupportedMediaType,
}

impl Rejection {
    fn into_error(self) -> ApiError {
        match self {
            Self::TooLarge => ApiError::payload_too_large(format!(
                "Request body exceeds {MAX_BODY_BYTES} bytes"
            )),
            Self::UnsupportedMediaType => ApiError::unsupported_media_type(
                "Invalid content-type. Expected application/json",
            ),
        }
    }
}

fn declared_length(req: &ServiceRequest) -> Option<u64> {
    req.headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
}

fn check(req: &ServiceRequest) -> Option<Rejection> {
    if declared_length(req).is_some_and(|len| len > MAX_BODY_BYTES as u64) {
        return Some(Rejection::TooLarge);
    }

    let method = req.method();
    if method == Method::POST || method == Method::PUT {
        let acceptable = match req.headers().get(header::CONTENT_TYPE) {
            None => true,
            Some(value) => value.is_empty() || value.as_bytes() == JSON_CONTENT_TYPE.as_bytes(),
        };
        if !acceptable {
            return Some(Rejection::UnsupportedMediaType);
        }
    }
    None
}

impl<S, B> Service<ServiceRequest> for RequestValidationMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            if let Some(rejection) = check(&req) {
                debug!(?rejection, path = req.path(), "request rejected before routing");
                let res = req.error_response(rejection.into_error());
                return Ok(res.map_into_right_body());
            }
            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

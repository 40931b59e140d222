//! Security response headers and HTTPS enforcement.
//!
//! Every response gets `X-Content-Type-Options`, `X-Frame-Options` and
//! `X-XSS-Protection`. In production the middleware also sets
//! `Strict-Transport-Security` and answers requests that a proxy marked as
//! plain HTTP (`X-Forwarded-Proto: http`) with a 301 to the HTTPS URL; the
//! downstream service is never invoked for those.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::HttpResponse;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";
const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Middleware factory adding security headers.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use users_api::middleware::SecurityHeaders;
///
/// let app = App::new().wrap(SecurityHeaders::new(false));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SecurityHeaders {
    enforce_https: bool,
}

impl SecurityHeaders {
    /// `enforce_https` enables HSTS and the HTTP to HTTPS redirect.
    pub fn new(enforce_https: bool) -> Self {
        Self { enforce_https }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SecurityHeaders
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = SecurityHeadersMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SecurityHeadersMiddleware {
            service: Rc::new(service),
            enforce_https: self.enforce_https,
        }))
    }
}

/// Service wrapper produced by [`SecurityHeaders`].
pub struct SecurityHeadersMiddleware<S> {
    service: Rc<S>,
    enforce_https: bool,
}

fn apply_headers(headers: &mut HeaderMap, enforce_https: bool) {
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::X_XSS_PROTECTION,
        HeaderValue::from_static("1; mode=block"),
    );
    if enforce_https {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(HSTS_VALUE),
        );
    }
}

/// Build the `https://` target for a request that arrived over plain HTTP.
fn https_location(req: &ServiceRequest) -> String {
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| req.connection_info().host().to_owned());
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| req.path());
    format!("https://{host}{target}")
}

fn forwarded_as_plain_http(req: &ServiceRequest) -> bool {
    req.headers()
        .get(HeaderName::from_static(FORWARDED_PROTO))
        .and_then(|value| value.to_str().ok())
        == Some("http")
}

impl<S, B> Service<ServiceRequest> for SecurityHeadersMiddleware<S>
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
        let enforce_https = self.enforce_https;

        if enforce_https && forwarded_as_plain_http(&req) {
            let location = https_location(&req);
            debug!(%location, "redirecting plain HTTP request");
            let mut response = HttpResponse::MovedPermanently()
                .insert_header((header::LOCATION, location))
                .finish();
            apply_headers(response.headers_mut(), enforce_https);
            let res = req.into_response(response).map_into_right_body();
            return Box::pin(async move { Ok(res) });
        }

        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let mut res = service.call(req).await?;
            apply_headers(res.headers_mut(), enforce_https);
            Ok(res.map_into_left_body())
        })
    }
}

//! CORS headers for the single configured frontend origin.
//!
//! Preflight (`OPTIONS`) requests are answered here with 200 and an empty
//! body for any path; they never reach routing or handlers.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::Error;
use actix_web::HttpResponse;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::Method;
use actix_web::http::header::{self, HeaderMap, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";
const MAX_AGE_SECS: &str = "86400";

/// Middleware factory adding CORS headers for one allowed origin.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use users_api::middleware::Cors;
///
/// let app = App::new().wrap(Cors::new("http://localhost:3000"));
/// ```
#[derive(Debug, Clone)]
pub struct Cors {
    allow_origin: Option<HeaderValue>,
}

impl Cors {
    /// Allow requests from `frontend_url`.
    ///
    /// A value that is not a legal header value is logged and the
    /// `Access-Control-Allow-Origin` header is then omitted.
    pub fn new(frontend_url: &str) -> Self {
        let allow_origin = match HeaderValue::from_str(frontend_url) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(%error, frontend_url, "frontend URL is not a valid header value");
                None
            }
        };
        Self { allow_origin }
    }
}

impl<S, B> Transform<S, ServiceRequest> for Cors
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = CorsMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CorsMiddleware {
            service: Rc::new(service),
            allow_origin: self.allow_origin.clone(),
        }))
    }
}

/// Service wrapper produced by [`Cors`].
pub struct CorsMiddleware<S> {
    service: Rc<S>,
    allow_origin: Option<HeaderValue>,
}

fn apply_headers(headers: &mut HeaderMap, allow_origin: Option<&HeaderValue>) {
    if let Some(origin) = allow_origin {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(MAX_AGE_SECS),
    );
}

impl<S, B> Service<ServiceRequest> for CorsMiddleware<S>
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
        let allow_origin = self.allow_origin.clone();

        if req.method() == Method::OPTIONS {
            let mut response = HttpResponse::Ok().finish();
            apply_headers(response.headers_mut(), allow_origin.as_ref());
            let res = req.into_response(response).map_into_right_body();
            return Box::pin(async move { Ok(res) });
        }

        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let mut res = service.call(req).await?;
            apply_headers(res.headers_mut(), allow_origin.as_ref());
            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test, web};
    use rstest::rstest;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ORIGIN: &str = "https://testfrontend.example.com";

    macro_rules! counting_app {
        ($calls:expr) => {{
            let calls = Arc::clone(&$calls);
            actix_test::init_service(App::new().wrap(Cors::new(ORIGIN)).default_service(web::to(
                move || {
                    let calls = Arc::clone(&calls);
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        HttpResponse::Ok().finish()
                    }
                },
            )))
            .await
        }};
    }

    #[actix_web::test]
    async fn adds_headers_to_regular_responses() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = counting_app!(calls);
        let res = actix_test::call_service(&app, actix_test::TestRequest::get().uri("/test").to_request()).await;

        assert_eq!(res.status(), StatusCode::OK);
        let headers = res.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static(ORIGIN))
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_METHODS),
            Some(&HeaderValue::from_static(ALLOW_METHODS))
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS),
            Some(&HeaderValue::from_static("true"))
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_MAX_AGE),
            Some(&HeaderValue::from_static(MAX_AGE_SECS))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[case("/test")]
    #[case("/api/users/abc")]
    #[case("/does/not/exist")]
    #[actix_web::test]
    async fn preflight_short_circuits(#[case] path: &str) {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = counting_app!(calls);
        let req = actix_test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri(path)
            .to_request();
        let res = actix_test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static(ORIGIN))
        );
        let body = actix_test::read_body(res).await;
        assert!(body.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[rstest]
    fn invalid_origin_is_dropped() {
        let cors = Cors::new("bad\norigin");
        assert!(cors.allow_origin.is_none());
    }
}

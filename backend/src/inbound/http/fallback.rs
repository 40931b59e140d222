//! JSON answers for requests no handler claims.

use actix_web::HttpResponse;

use crate::domain::Error;
use crate::inbound::http::ApiResult;

/// Default service for the whole application: unmatched paths.
pub async fn not_found() -> ApiResult<HttpResponse> {
    Err(Error::not_found("Not found"))
}

/// Default service for a registered resource: path matched, method did not.
pub async fn method_not_allowed() -> ApiResult<HttpResponse> {
    Err(Error::method_not_allowed("Method not allowed"))
}

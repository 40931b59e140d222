//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer (health,
//! hello, users) together with the request and response schemas they use.
//! The generated document backs Swagger UI in debug builds and is exported
//! via `cargo run --bin openapi-dump` for external tooling.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode, User};
use crate::inbound::http::health::{ConfigResponse, HealthResponse};
use crate::inbound::http::hello::HelloResponse;
use crate::inbound::http::validation::UserPayload;

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Users API",
        description = "User CRUD backed by PostgreSQL, plus health and connectivity probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::health::health,
        crate::inbound::http::health::health_config,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::hello::hello,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::get_user,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::delete_user,
    ),
    components(schemas(
        User,
        UserPayload,
        Error,
        ErrorCode,
        HealthResponse,
        ConfigResponse,
        HelloResponse
    )),
    tags(
        (name = "users", description = "Create, read, update and delete users"),
        (name = "hello", description = "Database round trip check"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI paths and schema field structure.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn object_fields(doc: &utoipa::openapi::OpenApi, name: &str) -> Vec<String> {
        let schemas = &doc.components.as_ref().expect("components").schemas;
        match schemas.get(name).expect("schema registered") {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected Object schema for {name}"),
        }
    }

    #[rstest]
    #[case("/health")]
    #[case("/health/config")]
    #[case("/health/ready")]
    #[case("/health/live")]
    #[case("/api/hello")]
    #[case("/api/users")]
    #[case("/api/users/{id}")]
    fn documents_every_route(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[test]
    fn user_schema_uses_snake_case_fields() {
        let fields = object_fields(&ApiDoc::openapi(), "User");
        for field in ["id", "name", "email", "created_at", "updated_at"] {
            assert!(fields.iter().any(|f| f == field), "User lacks '{field}'");
        }
    }

    #[test]
    fn error_schema_has_code_and_message() {
        let fields = object_fields(&ApiDoc::openapi(), "Error");
        assert!(fields.iter().any(|f| f == "code"));
        assert!(fields.iter().any(|f| f == "message"));
    }
}

//! Users API handlers.
//!
//! ```text
//! GET    /api/users
//! POST   /api/users        {"name":"Ada","email":"ada@example.com"}
//! GET    /api/users/{id}
//! PUT    /api/users/{id}   {"name":"Ada","email":"ada@example.com"}
//! DELETE /api/users/{id}
//! ```

use actix_web::{HttpResponse, web};

use crate::domain::{Error, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{UserPayload, decode_user_draft, parse_user_id};

/// List all users, newest first.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "Users", body = [User]),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
pub async fn list_users(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<User>>> {
    let users = state.users.list_all().await?;
    Ok(web::Json(users))
}

/// Fetch one user.
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 400, description = "Identifier is not an integer", body = Error),
        (status = 404, description = "User not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;
    state
        .users
        .find_by_id(id)
        .await?
        .map(web::Json)
        .ok_or_else(|| Error::not_found("User not found"))
}

/// Create a user.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = UserPayload,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Malformed JSON or missing fields", body = Error),
        (status = 409, description = "Email already exists", body = Error),
        (status = 413, description = "Body too large", body = Error),
        (status = 415, description = "Content type is not application/json", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
pub async fn create_user(
    state: web::Data<HttpState>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let draft = decode_user_draft(&body)?;
    let user = state.users.create(&draft).await?;
    tracing::info!(user_id = %user.id(), "user created");
    Ok(HttpResponse::Created().json(user))
}

/// Replace name and email of a user.
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User identifier")),
    request_body = UserPayload,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Invalid identifier, malformed JSON or missing fields", body = Error),
        (status = 404, description = "User not found", body = Error),
        (status = 409, description = "Email already exists", body = Error),
        (status = 413, description = "Body too large", body = Error),
        (status = 415, description = "Content type is not application/json", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;
    let draft = decode_user_draft(&body)?;
    let user = state.users.update(id, &draft).await?;
    Ok(web::Json(user))
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User identifier")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Identifier is not an integer", body = Error),
        (status = 404, description = "User not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = parse_user_id(&path)?;
    state.users.delete(id).await?;
    tracing::info!(user_id = %id, "user deleted");
    Ok(HttpResponse::NoContent().finish())
}

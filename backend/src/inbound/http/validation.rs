//! Shared validation helpers for inbound HTTP adapters.
//!
//! Path identifiers and JSON bodies are decoded by hand rather than through
//! Actix extractors so every failure becomes a 400 with the same error
//! envelope. (The `Path` extractor answers 404, and the `Json` extractor
//! refuses bodies that carry no content type.)

use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{Error, UserDraft, UserId, UserValidationError};

/// Validation error codes reported in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidId,
    InvalidJson,
    MissingField,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidId => "invalid_id",
            ErrorCode::InvalidJson => "invalid_json",
            ErrorCode::MissingField => "missing_field",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

const ID_FIELD: FieldName = FieldName::new("id");
const NAME_FIELD: FieldName = FieldName::new("name");
const EMAIL_FIELD: FieldName = FieldName::new("email");

fn field_error(field: FieldName, code: ErrorCode, message: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

/// Request body for create and update.
///
/// Missing or `null` fields decode as empty strings and are then rejected by
/// [`UserDraft::try_new`]. Unknown fields are ignored.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UserPayload {
    #[serde(default)]
    #[schema(example = "Ada Lovelace")]
    name: Option<String>,
    #[serde(default)]
    #[schema(example = "ada@example.com")]
    email: Option<String>,
}

/// Parse the `{id}` path segment as a user identifier.
pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    raw.parse::<UserId>()
        .map_err(|_| field_error(ID_FIELD, ErrorCode::InvalidId, "Invalid user ID"))
}

/// Decode a JSON request body into a validated [`UserDraft`].
pub(crate) fn decode_user_draft(body: &[u8]) -> Result<UserDraft, Error> {
    let payload: UserPayload = serde_json::from_slice(body).map_err(|_| {
        Error::invalid_request("Invalid JSON").with_details(json!({
            "code": ErrorCode::InvalidJson.as_str(),
        }))
    })?;

    UserDraft::try_new(
        payload.name.unwrap_or_default(),
        payload.email.unwrap_or_default(),
    )
    .map_err(|err| {
        let field = match err {
            UserValidationError::EmptyName => NAME_FIELD,
            UserValidationError::EmptyEmail => EMAIL_FIELD,
        };
        field_error(field, ErrorCode::MissingField, "Name and email are required")
    })
}

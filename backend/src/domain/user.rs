//! User data model.
//!
//! [`User`] is the persisted record as read back from storage. [`UserDraft`]
//! is the validated write input for create and update; it is the only way to
//! hand a name/email pair to the repository, so empty values never reach the
//! database.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Validation errors raised while building a [`UserDraft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
    EmptyEmail,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// A path segment that is not a 32-bit integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidUserId(String);

impl InvalidUserId {
    /// The rejected input.
    pub fn raw(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for InvalidUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user id must be an integer, got {:?}", self.0)
    }
}

impl std::error::Error for InvalidUserId {}

/// Server-generated integer identifier of a stored user.
///
/// # Examples
/// ```
/// use users_api::domain::UserId;
///
/// let id: UserId = "42".parse().expect("numeric id");
/// assert_eq!(id.value(), 42);
/// assert!("abc".parse::<UserId>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i32);

impl UserId {
    /// Wrap a raw identifier.
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    /// Access the raw identifier.
    pub fn value(self) -> i32 {
        self.0
    }
}

impl FromStr for UserId {
    type Err = InvalidUserId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i32>()
            .map(Self)
            .map_err(|_| InvalidUserId(s.to_owned()))
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated name/email pair for create and update.
///
/// ## Invariants
/// - `name` and `email` are non-empty strings. Whitespace counts as content
///   and values are stored exactly as supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDraft {
    name: String,
    email: String,
}

impl UserDraft {
    /// Validate and construct a draft.
    ///
    /// # Examples
    /// ```
    /// use users_api::domain::{UserDraft, UserValidationError};
    ///
    /// assert!(UserDraft::try_new("Ann", "ann@example.com").is_ok());
    /// assert_eq!(
    ///     UserDraft::try_new("Ann", "").unwrap_err(),
    ///     UserValidationError::EmptyEmail
    /// );
    /// ```
    pub fn try_new(
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, UserValidationError> {
        let name = name.into();
        let email = email.into();
        if name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if email.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        Ok(Self { name, email })
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn email(&self) -> &str {
        self.email.as_str()
    }
}

/// A stored user.
///
/// ## Invariants
/// - `id`, `created_at` and `updated_at` are assigned by storage.
/// - `updated_at >= created_at`.
///
/// Serialises with snake_case keys and RFC 3339 timestamps:
/// `{"id":1,"name":"Ann","email":"ann@example.com","created_at":"…","updated_at":"…"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    #[schema(value_type = i32, example = 1)]
    id: UserId,
    #[schema(example = "Ada Lovelace")]
    name: String,
    #[schema(example = "ada@example.com")]
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Assemble a user from a validated draft and storage-assigned values.
    pub fn new(
        id: UserId,
        draft: UserDraft,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let UserDraft { name, email } = draft;
        Self {
            id,
            name,
            email,
            created_at,
            updated_at,
        }
    }

    /// Rebuild a user from a storage row without re-validating it.
    pub(crate) fn from_storage(
        id: UserId,
        name: String,
        email: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Moment the row was inserted.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Moment of the last update; equals `created_at` for untouched rows.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

//! Port abstraction for user persistence adapters and their errors.
//!
//! The [`UserRepository`] trait is the only path from the HTTP handlers to
//! stored users. Adapters translate their own failures into
//! [`UserPersistenceError`] so handlers can map them onto status codes without
//! inspecting driver messages.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{User, UserDraft, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// No row matches the requested identifier.
        NotFound { id: i32 } => "user {id} not found",
        /// A unique constraint rejected the write (duplicate email).
        Conflict { message: String } => "user already exists: {message}",
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

/// Port for user storage and retrieval.
///
/// # Ordering
///
/// [`UserRepository::list_all`] returns users newest first by `created_at`,
/// breaking ties on `id` (descending) so the order is total.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch every stored user, newest first.
    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Fetch a user by identifier.
    ///
    /// Returns `None` when no row matches; absence is not an error.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Insert a new user and return the stored record.
    ///
    /// Returns [`UserPersistenceError::Conflict`] when the email is taken.
    async fn create(&self, draft: &UserDraft) -> Result<User, UserPersistenceError>;

    /// Replace name and email of an existing user and refresh `updated_at`.
    ///
    /// `created_at` is left untouched.
    async fn update(&self, id: UserId, draft: &UserDraft) -> Result<User, UserPersistenceError>;

    /// Remove a user.
    ///
    /// Returns [`UserPersistenceError::NotFound`] when no row was removed.
    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError>;
}

/// In-memory repository for tests and local wiring without a database.
///
/// Mirrors the storage rules of the Diesel adapter: serial identifiers,
/// unique emails, newest-first listing.
#[derive(Debug, Default)]
pub struct FixtureUserRepository {
    state: Mutex<FixtureState>,
}

#[derive(Debug, Default)]
struct FixtureState {
    next_id: i32,
    users: Vec<User>,
}

impl FixtureUserRepository {
    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut FixtureState) -> Result<T, UserPersistenceError>,
    ) -> Result<T, UserPersistenceError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| UserPersistenceError::connection("fixture state poisoned"))?;
        f(&mut state)
    }
}

impl FixtureState {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .iter()
            .any(|user| user.email() == email && Some(user.id()) != except)
    }

    fn position(&self, id: UserId) -> Result<usize, UserPersistenceError> {
        self.users
            .iter()
            .position(|user| user.id() == id)
            .ok_or_else(|| UserPersistenceError::not_found(id.value()))
    }
}

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        self.with_state(|state| {
            let mut users = state.users.clone();
            users.sort_by(|a, b| {
                b.created_at()
                    .cmp(&a.created_at())
                    .then_with(|| b.id().value().cmp(&a.id().value()))
            });
            Ok(users)
        })
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        self.with_state(|state| Ok(state.users.iter().find(|user| user.id() == id).cloned()))
    }

    async fn create(&self, draft: &UserDraft) -> Result<User, UserPersistenceError> {
        self.with_state(|state| {
            if state.email_taken(draft.email(), None) {
                return Err(UserPersistenceError::conflict(draft.email()));
            }
            state.next_id += 1;
            let now = Utc::now();
            let user = User::new(UserId::new(state.next_id), draft.clone(), now, now);
            state.users.push(user.clone());
            Ok(user)
        })
    }

    async fn update(&self, id: UserId, draft: &UserDraft) -> Result<User, UserPersistenceError> {
        self.with_state(|state| {
            let index = state.position(id)?;
            if state.email_taken(draft.email(), Some(id)) {
                return Err(UserPersistenceError::conflict(draft.email()));
            }
            let created_at = state.users[index].created_at();
            let user = User::new(id, draft.clone(), created_at, Utc::now().max(created_at));
            state.users[index] = user.clone();
            Ok(user)
        })
    }

    async fn delete(&self, id: UserId) -> Result<(), UserPersistenceError> {
        self.with_state(|state| {
            let index = state.position(id)?;
            state.users.remove(index);
            Ok(())
        })
    }
}

//! Record store access.
//!
//! # Schema: `adoption`
//!
//! ## Tables
//!
//! - `user` - Accounts (username, optional email, Argon2 hash)
//! - `auth_token` - One opaque API token per user
//! - `pet` - Pet listings, each owned by one user
//! - `adoption_request` - Requests against a pet, unique per (pet, requester)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p pet-adoption-cli -- migrate
//! ```
//!
//! Every table is reached through a repository port so the HTTP layer can
//! run against `PostgreSQL` or the in-process [`MemoryStore`].

pub mod adoption_requests;
pub mod memory;
pub mod pets;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use pet_adoption_core::{AdoptionRequestId, AuthToken, PetId, UserId, Username};

use crate::models::{
    AdoptionRequest, AdoptionRequestChanges, AdoptionRequestDetail, NewAdoptionRequest, NewPet,
    NewUser, Pet, PetChanges, PetFilter, User,
};

pub use adoption_requests::PgAdoptionRequestRepository;
pub use memory::MemoryStore;
pub use pets::PgPetRepository;
pub use users::PgUserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map constraint violations on insert to repository errors.
///
/// A unique violation becomes [`RepositoryError::Conflict`] carrying
/// `what`; a foreign-key violation means a referenced row is gone and
/// becomes [`RepositoryError::NotFound`].
pub(crate) fn constraint_error(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(what.to_owned());
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::NotFound;
        }
    }
    RepositoryError::Database(e)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

// =============================================================================
// Ports
// =============================================================================

/// Account and token persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new account together with its first token.
    ///
    /// Fails with [`RepositoryError::Conflict`] when the username is taken.
    async fn create_user(&self, user: &NewUser, token: &AuthToken)
    -> Result<User, RepositoryError>;

    /// Fetch an account and its password hash by username.
    async fn get_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError>;

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Return the user's token, storing `candidate` if they have none yet.
    async fn token_for_user(
        &self,
        user_id: UserId,
        candidate: &AuthToken,
    ) -> Result<AuthToken, RepositoryError>;

    /// Resolve a token to its account.
    async fn get_by_token(&self, token: &AuthToken) -> Result<Option<User>, RepositoryError>;
}

/// Pet listing persistence.
#[async_trait]
pub trait PetRepository: Send + Sync {
    /// Pets matching every set filter, ordered by id.
    async fn list(&self, filter: &PetFilter) -> Result<Vec<Pet>, RepositoryError>;

    async fn get(&self, id: PetId) -> Result<Option<Pet>, RepositoryError>;

    async fn create(&self, owner: UserId, pet: &NewPet) -> Result<Pet, RepositoryError>;

    /// Apply `changes`, returning `None` when the pet does not exist.
    async fn update(&self, id: PetId, changes: &PetChanges)
    -> Result<Option<Pet>, RepositoryError>;

    /// Delete a pet and its adoption requests. Returns whether it existed.
    async fn delete(&self, id: PetId) -> Result<bool, RepositoryError>;
}

/// Adoption request persistence.
#[async_trait]
pub trait AdoptionRequestRepository: Send + Sync {
    /// Requests against pets owned by `owner`, ordered by id.
    async fn list_for_owner(
        &self,
        owner: UserId,
    ) -> Result<Vec<AdoptionRequestDetail>, RepositoryError>;

    /// A request, only if its pet is owned by `owner`.
    async fn get_for_owner(
        &self,
        id: AdoptionRequestId,
        owner: UserId,
    ) -> Result<Option<AdoptionRequestDetail>, RepositoryError>;

    /// Whether `requester` already has a request for `pet`.
    async fn exists(&self, pet: PetId, requester: UserId) -> Result<bool, RepositoryError>;

    /// Fails with [`RepositoryError::Conflict`] on a duplicate (pet, requester).
    async fn create(&self, request: &NewAdoptionRequest)
    -> Result<AdoptionRequest, RepositoryError>;

    async fn update(
        &self,
        id: AdoptionRequestId,
        changes: &AdoptionRequestChanges,
    ) -> Result<Option<AdoptionRequest>, RepositoryError>;

    async fn delete(&self, id: AdoptionRequestId) -> Result<bool, RepositoryError>;
}

/// The repositories the HTTP layer works with.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub pets: Arc<dyn PetRepository>,
    pub adoption_requests: Arc<dyn AdoptionRequestRepository>,
    pool: Option<PgPool>,
}

impl Repositories {
    /// Repositories backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            pets: Arc::new(PgPetRepository::new(pool.clone())),
            adoption_requests: Arc::new(PgAdoptionRequestRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Repositories sharing one fresh in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            pets: store.clone(),
            adoption_requests: store,
            pool: None,
        }
    }

    /// Check that the record store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if `PostgreSQL` does not answer.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories")
            .field("postgres", &self.pool.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use sqlx::error::{DatabaseError, ErrorKind};

    use super::*;

    #[derive(Debug, Error)]
    #[error("constraint violated")]
    struct Violation(ErrorKind);

    impl DatabaseError for Violation {
        fn message(&self) -> &str {
            "constraint violated"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            None
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.0 {
                ErrorKind::UniqueViolation => ErrorKind::UniqueViolation,
                ErrorKind::ForeignKeyViolation => ErrorKind::ForeignKeyViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    fn violation(kind: ErrorKind) -> sqlx::Error {
        sqlx::Error::Database(Box::new(Violation(kind)))
    }

    #[test]
    fn test_unique_violation_is_conflict() {
        let err = constraint_error(violation(ErrorKind::UniqueViolation), "duplicate request");
        assert!(matches!(err, RepositoryError::Conflict(ref m) if m == "duplicate request"));
    }

    #[test]
    fn test_foreign_key_violation_is_not_found() {
        let err = constraint_error(violation(ErrorKind::ForeignKeyViolation), "duplicate request");
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[test]
    fn test_other_errors_pass_through() {
        let err = constraint_error(violation(ErrorKind::Other), "duplicate request");
        assert!(matches!(err, RepositoryError::Database(_)));
        let err = constraint_error(sqlx::Error::RowNotFound, "duplicate request");
        assert!(matches!(err, RepositoryError::Database(_)));
    }
}

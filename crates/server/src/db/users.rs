//! `PostgreSQL` repository for accounts and their API tokens.

use async_trait::async_trait;
use sqlx::PgPool;

use pet_adoption_core::{AuthToken, UserId, Username};

use super::{RepositoryError, UserRepository, constraint_error};
use crate::models::{NewUser, User};

/// Row returned by the password lookup.
#[derive(sqlx::FromRow)]
struct UserWithHash {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

/// Account repository backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(
        &self,
        new_user: &NewUser,
        token: &AuthToken,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r"
            INSERT INTO adoption.user (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, date_joined
            ",
        )
        .bind(&new_user.username)
        .bind(new_user.email.as_ref())
        .bind(&new_user.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| constraint_error(e, "username already exists"))?;

        sqlx::query(
            r"
            INSERT INTO adoption.auth_token (key, user_id)
            VALUES ($1, $2)
            ",
        )
        .bind(token)
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(user)
    }

    async fn get_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithHash>(
            r"
            SELECT id, username, email, date_joined, password_hash
            FROM adoption.user
            WHERE username = $1
            ",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| (r.user, r.password_hash)))
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, username, email, date_joined
            FROM adoption.user
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn token_for_user(
        &self,
        user_id: UserId,
        candidate: &AuthToken,
    ) -> Result<AuthToken, RepositoryError> {
        // Keeps the existing token when the user already has one
        sqlx::query(
            r"
            INSERT INTO adoption.auth_token (key, user_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            ",
        )
        .bind(candidate)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        let token = sqlx::query_scalar::<_, AuthToken>(
            r"
            SELECT key
            FROM adoption.auth_token
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        token.ok_or(RepositoryError::NotFound)
    }

    async fn get_by_token(&self, token: &AuthToken) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT u.id, u.username, u.email, u.date_joined
            FROM adoption.auth_token t
            JOIN adoption.user u ON u.id = t.user_id
            WHERE t.key = $1
            ",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

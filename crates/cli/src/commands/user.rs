//! Account management commands.
//!
//! # Usage
//!
//! ```bash
//! pets-cli user create -u alice -e alice@example.com -p 'correct horse'
//! ```
//!
//! Accounts go through the same signup rules as `POST /signup`; the new
//! account's token is printed on success.

use thiserror::Error;

use pet_adoption_core::AuthToken;
use pet_adoption_server::db::Repositories;
use pet_adoption_server::models::SignupInput;
use pet_adoption_server::services::{AuthError, AuthService};

use super::{DATABASE_URL_VAR, database_url};

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum UserError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Signup rejected the account.
    #[error("Could not create account: {0}")]
    Auth(#[from] AuthError),
}

/// Create an account and return its token.
///
/// # Errors
///
/// Returns `UserError::Auth` if the username is taken or a field is invalid.
pub async fn create(
    username: String,
    email: Option<String>,
    password: String,
) -> Result<AuthToken, UserError> {
    let database_url = database_url().ok_or(UserError::MissingEnvVar(DATABASE_URL_VAR))?;

    tracing::info!("Connecting to database...");
    let pool = pet_adoption_server::db::create_pool(&database_url).await?;
    let repositories = Repositories::postgres(pool);

    let (user, token) = AuthService::new(repositories.users.as_ref())
        .signup(SignupInput::new(username, email, password))
        .await?;

    tracing::info!(user_id = %user.id, "Created account {}", user.username);
    Ok(token)
}

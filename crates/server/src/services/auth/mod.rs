//! Authentication service.
//!
//! Password accounts with one opaque API token per user.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use rand::RngCore;

use pet_adoption_core::{AuthToken, Username, UsernameError};

use crate::db::{RepositoryError, UserRepository};
use crate::models::{CurrentUser, LoginInput, NewUser, SignupInput, User};
use crate::validation::{self, BLANK, Presence, ValidationErrors, string};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
///
/// Handles signup, login and token resolution.
pub struct AuthService<'a> {
    users: &'a dyn UserRepository,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a dyn UserRepository) -> Self {
        Self { users }
    }

    /// Register a new account and issue its token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Invalid` if any field fails validation.
    /// Returns `AuthError::UserAlreadyExists` if the username is taken.
    pub async fn signup(&self, input: SignupInput) -> Result<(User, AuthToken), AuthError> {
        let mut errors = ValidationErrors::new();
        let username = errors.check(
            "username",
            input.username,
            Presence::Required,
            string(username_rule),
        );
        // A blank email is the same as no email
        let email = input
            .email
            .filter(|email| email.as_str().is_none_or(|text| !text.trim().is_empty()));
        let email = errors.check("email", email, Presence::Optional, string(validation::email));
        let password = errors.check(
            "password",
            input.password,
            Presence::Required,
            string(validate_password),
        );

        let (Some(username), Some(password)) = (username, password) else {
            return Err(AuthError::Invalid(errors));
        };
        if !errors.is_empty() {
            return Err(AuthError::Invalid(errors));
        }

        let new_user = NewUser {
            username,
            email,
            password_hash: hash_password(&password)?,
        };
        let token = generate_token();

        let user = self
            .users
            .create_user(&new_user, &token)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, username = %user.username, "Account created");
        Ok((user, token))
    }

    /// Check a username and password, returning the account's token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Invalid` if a field is missing.
    /// Returns `AuthError::InvalidCredentials` if the username/password is wrong.
    pub async fn login(&self, input: LoginInput) -> Result<(User, AuthToken), AuthError> {
        let mut errors = ValidationErrors::new();
        let username = errors.check("username", input.username, Presence::Required, string(not_blank));
        let password = errors.check("password", input.password, Presence::Required, string(not_blank));
        let (Some(username), Some(password)) = (username, password) else {
            return Err(AuthError::Invalid(errors));
        };

        // A name that could never have signed up cannot match an account
        let username =
            Username::parse(username.trim()).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(&password, &password_hash)?;

        let token = self.users.token_for_user(user.id, &generate_token()).await?;
        Ok((user, token))
    }

    /// Resolve a raw token to its account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token is malformed or unknown.
    pub async fn authenticate(&self, raw_token: &str) -> Result<User, AuthError> {
        let token = AuthToken::parse(raw_token).map_err(|_| AuthError::InvalidToken)?;
        self.users
            .get_by_token(&token)
            .await?
            .ok_or(AuthError::InvalidToken)
    }

    /// Fetch the caller's own account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the account no longer exists.
    pub async fn me(&self, caller: &CurrentUser) -> Result<User, AuthError> {
        self.users
            .get_by_id(caller.id)
            .await?
            .ok_or(AuthError::InvalidToken)
    }
}

/// Generate a fresh random token.
fn generate_token() -> AuthToken {
    let mut bytes = [0u8; AuthToken::BYTES];
    rand::rng().fill_bytes(&mut bytes);
    AuthToken::from_random_bytes(&bytes)
}

fn username_rule(value: String) -> Result<Username, String> {
    Username::parse(value.trim()).map_err(|e| match e {
        UsernameError::Empty => BLANK.to_owned(),
        UsernameError::TooLong { max } => {
            format!("Ensure this field has no more than {max} characters.")
        }
        UsernameError::InvalidCharacter => "Enter a valid username. This value may contain \
                                            only letters, numbers, and @/./+/-/_ characters."
            .to_owned(),
    })
}

fn not_blank(value: String) -> Result<String, String> {
    if value.trim().is_empty() {
        Err(BLANK.to_owned())
    } else {
        Ok(value)
    }
}

/// Validate password meets requirements.
fn validate_password(password: String) -> Result<String, String> {
    if password.trim().is_empty() {
        return Err(BLANK.to_owned());
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Ensure this field has at least {MIN_PASSWORD_LENGTH} characters."
        ));
    }
    Ok(password)
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::db::MemoryStore;

    fn signup_input(username: &str, password: &str) -> SignupInput {
        SignupInput::new(
            username.to_owned(),
            Some("owner@example.com".to_owned()),
            password.to_owned(),
        )
    }

    fn login_input(username: &str, password: &str) -> LoginInput {
        LoginInput {
            username: Some(json!(username)),
            password: Some(json!(password)),
        }
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong horse", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_generated_tokens_are_valid_and_distinct() {
        let a = generate_token();
        let b = generate_token();
        assert!(AuthToken::parse(a.as_str()).is_ok());
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_signup_then_login_returns_same_token() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        let (user, token) = auth.signup(signup_input("alice", "s3cret-pass")).await.unwrap();
        assert_eq!(user.username.as_str(), "alice");
        assert_eq!(user.email.unwrap().as_str(), "owner@example.com");

        let (_, login_token) = auth.login(login_input("alice", "s3cret-pass")).await.unwrap();
        assert_eq!(login_token, token);

        let resolved = auth.authenticate(token.as_str()).await.unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn test_signup_rejects_short_password_and_bad_username() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        let err = auth.signup(signup_input("al ice", "short")).await.unwrap_err();
        let AuthError::Invalid(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(
            errors.field("password").unwrap(),
            ["Ensure this field has at least 8 characters."]
        );
        assert!(errors.field("username").is_some());
    }

    #[tokio::test]
    async fn test_signup_trims_username() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        let (user, token) = auth.signup(signup_input("  alice ", "s3cret-pass")).await.unwrap();
        assert_eq!(user.username.as_str(), "alice");

        let (_, login_token) = auth.login(login_input(" alice", "s3cret-pass")).await.unwrap();
        assert_eq!(login_token, token);
    }

    #[tokio::test]
    async fn test_signup_reports_mistyped_fields() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        let input = SignupInput {
            username: Some(json!(["alice"])),
            password: Some(json!(true)),
            ..SignupInput::default()
        };
        let AuthError::Invalid(errors) = auth.signup(input).await.unwrap_err() else {
            panic!("expected validation error");
        };
        assert_eq!(errors.field("username").unwrap(), [validation::NOT_A_STRING]);
        assert_eq!(errors.field("password").unwrap(), [validation::NOT_A_STRING]);
    }

    #[tokio::test]
    async fn test_signup_rejects_taken_username() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        auth.signup(signup_input("alice", "s3cret-pass")).await.unwrap();
        let err = auth.signup(signup_input("alice", "other-pass")).await.unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));
    }

    #[tokio::test]
    async fn test_signup_allows_missing_or_blank_email() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        let input = SignupInput {
            email: Some(json!("")),
            ..signup_input("alice", "s3cret-pass")
        };
        let (user, _) = auth.signup(input).await.unwrap();
        assert_eq!(user.email, None);
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_password() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        auth.signup(signup_input("alice", "s3cret-pass")).await.unwrap();
        let err = auth.login(login_input("alice", "nope-nope")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        let err = auth.login(login_input("nobody", "s3cret-pass")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_authenticate_rejects_unknown_and_malformed_tokens() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        let unknown = AuthToken::from_random_bytes(&[7; AuthToken::BYTES]);
        assert!(matches!(
            auth.authenticate(unknown.as_str()).await,
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            auth.authenticate("not-a-token").await,
            Err(AuthError::InvalidToken)
        ));
    }
}

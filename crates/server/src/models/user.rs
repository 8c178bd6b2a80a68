//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use pet_adoption_core::{Email, UserId, Username};

/// An account (domain type).
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Unique login name.
    pub username: Username,
    /// Optional contact address.
    pub email: Option<Email>,
    /// When the account was created.
    pub date_joined: DateTime<Utc>,
}

/// Fields needed to store a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub email: Option<Email>,
    /// Argon2 PHC string, never the plain password.
    pub password_hash: String,
}

/// The authenticated caller of a request.
///
/// Resolved from the bearer token by the auth extractors and passed
/// explicitly into every service call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's login name.
    pub username: Username,
}

/// Signup payload as sent by clients, as raw JSON values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupInput {
    pub username: Option<Value>,
    pub email: Option<Value>,
    pub password: Option<Value>,
}

impl SignupInput {
    /// A payload built from plain strings, for callers outside HTTP.
    #[must_use]
    pub fn new(username: String, email: Option<String>, password: String) -> Self {
        Self {
            username: Some(Value::String(username)),
            email: email.map(Value::String),
            password: Some(Value::String(password)),
        }
    }
}

/// Login payload as sent by clients, as raw JSON values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
    pub username: Option<Value>,
    pub password: Option<Value>,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

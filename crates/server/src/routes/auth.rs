//! Account route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use pet_adoption_core::{AuthToken, Email, UserId, Username};

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::{LoginInput, SignupInput};
use crate::services::AuthService;
use crate::state::AppState;

/// Token issued by signup and login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: AuthToken,
    pub username: Username,
}

/// The caller's own account.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: UserId,
    pub username: Username,
    pub email: Option<Email>,
}

/// Create an account.
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<SignupInput>,
) -> Result<(StatusCode, Json<TokenResponse>)> {
    let (user, token) = AuthService::new(state.repositories().users.as_ref())
        .signup(input)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            token,
            username: user.username,
        }),
    ))
}

/// Exchange a username and password for the account's token.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginInput>,
) -> Result<Json<TokenResponse>> {
    let (user, token) = AuthService::new(state.repositories().users.as_ref())
        .login(input)
        .await?;

    Ok(Json(TokenResponse {
        token,
        username: user.username,
    }))
}

/// Show the authenticated account.
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
) -> Result<Json<UserResponse>> {
    let user = AuthService::new(state.repositories().users.as_ref())
        .me(&caller)
        .await?;

    Ok(Json(UserResponse {
        id: user.id,
        username: user.username,
        email: user.email,
    }))
}

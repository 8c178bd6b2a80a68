//! Token authentication extractors.
//!
//! Clients send `Authorization: Token <key>` (`Bearer <key>` works too).
//! Other schemes are ignored and the caller is treated as anonymous. A
//! malformed or unknown token is rejected with 401 on every route,
//! including routes that allow anonymous callers.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
};

use crate::error::{AppError, INVALID_TOKEN, set_sentry_user};
use crate::models::CurrentUser;
use crate::services::AuthService;
use crate::state::AppState;

/// Extractor that requires an authenticated caller.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_caller(parts, state)
            .await?
            .map(Self)
            .ok_or_else(AppError::not_authenticated)
    }
}

/// Extractor that optionally gets the authenticated caller.
///
/// Unlike `RequireAuth`, this does not reject anonymous requests, but it
/// still rejects a bad token.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_caller(parts, state).await?))
    }
}

/// Credentials found in the `Authorization` header.
#[derive(Debug, PartialEq, Eq)]
enum Credentials<'a> {
    /// No header, or a scheme this server does not handle.
    Anonymous,
    /// A token scheme with a single key.
    Token(&'a str),
    /// A token scheme with a missing or space-separated key.
    Malformed,
}

fn credentials(headers: &HeaderMap) -> Credentials<'_> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Credentials::Anonymous;
    };
    let Ok(value) = value.to_str() else {
        return Credentials::Malformed;
    };

    let mut parts = value.split_whitespace();
    let is_token_scheme = parts.next().is_some_and(|scheme| {
        scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer")
    });
    if !is_token_scheme {
        return Credentials::Anonymous;
    }
    match (parts.next(), parts.next()) {
        (Some(key), None) => Credentials::Token(key),
        _ => Credentials::Malformed,
    }
}

async fn resolve_caller(parts: &Parts, state: &AppState) -> Result<Option<CurrentUser>, AppError> {
    let key = match credentials(&parts.headers) {
        Credentials::Anonymous => return Ok(None),
        Credentials::Malformed => return Err(AppError::Unauthorized(INVALID_TOKEN.to_owned())),
        Credentials::Token(key) => key,
    };

    let user = AuthService::new(state.repositories().users.as_ref())
        .authenticate(key)
        .await?;
    set_sentry_user(&user.id, Some(user.username.as_str()));
    tracing::Span::current().record("user_id", user.id.as_i32());

    Ok(Some(CurrentUser::from(&user)))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(value) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    #[test]
    fn test_token_and_bearer_schemes() {
        assert_eq!(credentials(&headers("Token abc")), Credentials::Token("abc"));
        assert_eq!(credentials(&headers("bearer abc")), Credentials::Token("abc"));
    }

    #[test]
    fn test_missing_or_foreign_scheme_is_anonymous() {
        assert_eq!(credentials(&HeaderMap::new()), Credentials::Anonymous);
        assert_eq!(
            credentials(&headers("Basic dXNlcjpwYXNz")),
            Credentials::Anonymous
        );
    }

    #[test]
    fn test_malformed_token_header() {
        assert_eq!(credentials(&headers("Token")), Credentials::Malformed);
        assert_eq!(credentials(&headers("Token a b")), Credentials::Malformed);
    }
}

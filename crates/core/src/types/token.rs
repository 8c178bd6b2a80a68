//! Opaque bearer token type.
//!
//! Tokens are generated by the server from random bytes; this module only
//! knows their shape.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`AuthToken`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthTokenError {
    /// The key has the wrong length.
    #[error("token must be {expected} characters")]
    Length {
        /// Required length.
        expected: usize,
    },
    /// The key contains a character that is not lowercase hex.
    #[error("token must be lowercase hexadecimal")]
    NotHex,
}

/// An account's API token key.
///
/// Always 40 lowercase hexadecimal characters. The `Debug` output is
/// redacted so the key never ends up in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    /// Length of a token key in characters.
    pub const LENGTH: usize = 40;

    /// Number of random bytes a key is encoded from.
    pub const BYTES: usize = Self::LENGTH / 2;

    /// Parse a token key supplied by a client.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthTokenError`] if the key has the wrong length or
    /// is not lowercase hex.
    pub fn parse(s: &str) -> Result<Self, AuthTokenError> {
        if s.len() != Self::LENGTH {
            return Err(AuthTokenError::Length {
                expected: Self::LENGTH,
            });
        }

        if !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(AuthTokenError::NotHex);
        }

        Ok(Self(s.to_owned()))
    }

    /// Build a key by hex-encoding freshly generated random bytes.
    #[must_use]
    pub fn from_random_bytes(bytes: &[u8; Self::BYTES]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Returns the token key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}

impl std::str::FromStr for AuthToken {
    type Err = AuthTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for AuthToken {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for AuthToken {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for AuthToken {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

//! Choice enums for pet records.
//!
//! Both enums are stored as lowercase text, the same spelling used on the
//! wire, so the database `CHECK` constraints and the JSON API agree.

use serde::{Deserialize, Serialize};

/// A value that is not one of the allowed choices.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("\"{0}\" is not a valid choice.")]
pub struct InvalidChoice(pub String);

/// Implements `Display`, `FromStr`, `as_str` and text-column sqlx support
/// for a fieldless enum with a fixed lowercase spelling per variant.
macro_rules! text_choice {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The stored and serialized spelling.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = InvalidChoice;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(InvalidChoice(other.to_owned())),
                }
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Type<::sqlx::Postgres> for $name {
            fn type_info() -> ::sqlx::postgres::PgTypeInfo {
                <String as ::sqlx::Type<::sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &::sqlx::postgres::PgTypeInfo) -> bool {
                <String as ::sqlx::Type<::sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> ::sqlx::Decode<'r, ::sqlx::Postgres> for $name {
            fn decode(
                value: ::sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, ::sqlx::error::BoxDynError> {
                let s = <&str as ::sqlx::Decode<::sqlx::Postgres>>::decode(value)?;
                Ok(s.parse()?)
            }
        }

        #[cfg(feature = "postgres")]
        impl ::sqlx::Encode<'_, ::sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut ::sqlx::postgres::PgArgumentBuffer,
            ) -> Result<::sqlx::encode::IsNull, ::sqlx::error::BoxDynError> {
                <&str as ::sqlx::Encode<::sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }
    };
}

/// Species a pet can be listed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Dog,
    Cat,
    Bird,
}

text_choice!(Species {
    Dog => "dog",
    Cat => "cat",
    Bird => "bird",
});

/// Adoption status of a pet listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    /// Listed and open to adoption requests.
    #[default]
    Available,
    /// No longer looking for a home.
    Adopted,
}

text_choice!(PetStatus {
    Available => "available",
    Adopted => "adopted",
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_species_round_trips_through_text() {
        for species in Species::ALL {
            assert_eq!(species.as_str().parse::<Species>().unwrap(), *species);
        }
    }

    #[test]
    fn test_species_rejects_unknown_values() {
        let err = "lizard".parse::<Species>().unwrap_err();
        assert_eq!(err.to_string(), "\"lizard\" is not a valid choice.");
        assert!("Dog".parse::<Species>().is_err());
    }

    #[test]
    fn test_status_defaults_to_available() {
        assert_eq!(PetStatus::default(), PetStatus::Available);
    }

    #[test]
    fn test_serde_uses_lowercase() {
        assert_eq!(
            serde_json::to_string(&PetStatus::Adopted).unwrap(),
            "\"adopted\""
        );
        let parsed: Species = serde_json::from_str("\"bird\"").unwrap();
        assert_eq!(parsed, Species::Bird);
    }
}

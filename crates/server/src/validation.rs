//! Field-scoped input validation.
//!
//! Payload types deserialize every field as an optional raw JSON value and
//! run through a [`ValidationErrors`] collector, so one response reports
//! every bad field at once, wrong JSON types included, and only after the
//! caller has been allowed to touch the object.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use pet_adoption_core::{Email, InvalidChoice};

/// Key used for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const NOT_AN_INTEGER: &str = "A valid integer is required.";

/// Whether an absent field is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// Full replacement (`PUT`/create) or partial update (`PATCH`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Full,
    Partial,
}

impl WriteMode {
    /// Presence rule for a field that has no default value.
    #[must_use]
    pub const fn presence(self) -> Presence {
        match self {
            Self::Full => Presence::Required,
            Self::Partial => Presence::Optional,
        }
    }
}

/// Validation messages keyed by field name.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors with a single message on one field.
    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Errors with a single message that belongs to no particular field.
    #[must_use]
    pub fn non_field(message: impl Into<String>) -> Self {
        Self::single(NON_FIELD_ERRORS, message)
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_owned())
            .or_default()
            .push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Messages recorded for `field`, if any.
    #[must_use]
    pub fn field(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Run `rule` on a supplied value, recording its message on failure.
    ///
    /// Returns the converted value when it was supplied and valid.
    pub fn check<T, U>(
        &mut self,
        field: &str,
        value: Option<T>,
        presence: Presence,
        rule: impl FnOnce(T) -> Result<U, String>,
    ) -> Option<U> {
        match value {
            Some(value) => match rule(value) {
                Ok(converted) => Some(converted),
                Err(message) => {
                    self.add(field, message);
                    None
                }
            },
            None => {
                if presence == Presence::Required {
                    self.add(field, REQUIRED);
                }
                None
            }
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

// =============================================================================
// Rules
// =============================================================================

/// Adapt a text rule to a raw JSON value. Numbers are taken as their text.
pub fn string<U>(
    rule: impl FnOnce(String) -> Result<U, String>,
) -> impl FnOnce(Value) -> Result<U, String> {
    move |value| match value {
        Value::String(text) => rule(text),
        Value::Number(number) => rule(number.to_string()),
        _ => Err(NOT_A_STRING.to_owned()),
    }
}

/// Adapt an integer rule to a raw JSON value. Numeric strings are accepted.
pub fn integer<U>(
    rule: impl FnOnce(i64) -> Result<U, String>,
) -> impl FnOnce(Value) -> Result<U, String> {
    move |value| {
        let parsed = match &value {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse::<i64>().ok(),
            _ => None,
        };
        parsed.map_or_else(|| Err(NOT_AN_INTEGER.to_owned()), rule)
    }
}

/// Trimmed, non-blank text of at most `max` characters.
pub fn text(max: usize) -> impl FnOnce(String) -> Result<String, String> {
    move |value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(BLANK.to_owned());
        }
        if trimmed.chars().count() > max {
            return Err(format!(
                "Ensure this field has no more than {max} characters."
            ));
        }
        Ok(trimmed.to_owned())
    }
}

/// Free text that may be blank.
#[allow(clippy::unnecessary_wraps)]
pub fn optional_text(value: String) -> Result<String, String> {
    Ok(value.trim().to_owned())
}

/// A non-negative integer that fits a 32-bit signed column.
pub fn non_negative_int(value: i64) -> Result<i32, String> {
    if value < 0 {
        return Err("Ensure this value is greater than or equal to 0.".to_owned());
    }
    i32::try_from(value)
        .map_err(|_| format!("Ensure this value is less than or equal to {}.", i32::MAX))
}

/// One of the values of a choice enum.
pub fn choice<T>(value: String) -> Result<T, String>
where
    T: FromStr<Err = InvalidChoice>,
{
    value.parse::<T>().map_err(|e| e.to_string())
}

/// A syntactically valid email address.
pub fn email(value: String) -> Result<Email, String> {
    Email::parse(value.trim()).map_err(|_| INVALID_EMAIL.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pet_adoption_core::Species;

    use super::*;

    #[test]
    fn test_required_field_missing() {
        let mut errors = ValidationErrors::new();
        let value = errors.check("name", None::<String>, Presence::Required, text(100));
        assert!(value.is_none());
        assert_eq!(errors.field("name").unwrap(), [REQUIRED]);
    }

    #[test]
    fn test_optional_field_missing_is_fine() {
        let mut errors = ValidationErrors::new();
        let value = errors.check("name", None::<String>, Presence::Optional, text(100));
        assert!(value.is_none());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_text_trims_and_limits() {
        assert_eq!(text(5)("  Rex ".to_owned()).unwrap(), "Rex");
        assert_eq!(text(5)("   ".to_owned()).unwrap_err(), BLANK);
        assert_eq!(
            text(3)("Biscuit".to_owned()).unwrap_err(),
            "Ensure this field has no more than 3 characters."
        );
    }

    #[test]
    fn test_non_negative_int_bounds() {
        assert_eq!(non_negative_int(0).unwrap(), 0);
        assert!(non_negative_int(-1).is_err());
        assert!(non_negative_int(i64::from(i32::MAX) + 1).is_err());
    }

    #[test]
    fn test_choice_message() {
        let err = choice::<Species>("lizard".to_owned()).unwrap_err();
        assert_eq!(err, "\"lizard\" is not a valid choice.");
    }

    #[test]
    fn test_json_types_are_checked_per_field() {
        let mut errors = ValidationErrors::new();
        let age = errors.check(
            "age",
            Some(Value::from("old")),
            Presence::Required,
            integer(non_negative_int),
        );
        let name = errors.check(
            "name",
            Some(serde_json::json!(["Rex"])),
            Presence::Required,
            string(text(100)),
        );
        assert!(age.is_none() && name.is_none());
        assert_eq!(errors.field("age").unwrap(), [NOT_AN_INTEGER]);
        assert_eq!(errors.field("name").unwrap(), [NOT_A_STRING]);
    }

    #[test]
    fn test_json_coercions() {
        assert_eq!(integer(non_negative_int)(Value::from(" 4 ")).unwrap(), 4);
        assert_eq!(integer(non_negative_int)(Value::from(4)).unwrap(), 4);
        assert_eq!(
            integer(non_negative_int)(serde_json::json!(4.5)).unwrap_err(),
            NOT_AN_INTEGER
        );
        assert_eq!(string(text(15))(Value::from(5_551_234)).unwrap(), "5551234");
        assert_eq!(string(text(15))(Value::Bool(true)).unwrap_err(), NOT_A_STRING);
    }

    #[test]
    fn test_serializes_as_field_map() {
        let mut errors = ValidationErrors::single("age", "bad");
        errors.add(NON_FIELD_ERRORS, "worse");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"age": ["bad"], "non_field_errors": ["worse"]})
        );
    }

    #[test]
    fn test_display_joins_messages() {
        let mut errors = ValidationErrors::single("a", "one");
        errors.add("b", "two");
        assert_eq!(errors.to_string(), "a: one; b: two");
    }
}

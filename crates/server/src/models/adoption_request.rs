//! Adoption request domain types.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use pet_adoption_core::{AdoptionRequestId, Email, PetId, UserId};

use super::pet::{Pet, SHORT_TEXT_MAX};
use crate::validation::{
    NOT_AN_INTEGER, Presence, ValidationErrors, WriteMode, email, integer, optional_text, string,
    text,
};

/// Maximum length of a contact phone number.
pub const PHONE_MAX: usize = 15;

/// Message recorded when a create payload has no `pet_id`.
pub const PET_ID_REQUIRED: &str = "pet_id required";

/// A request to adopt a pet.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AdoptionRequest {
    pub id: AdoptionRequestId,
    pub pet_id: PetId,
    /// The authenticated account that submitted the request.
    pub requester_id: UserId,
    /// Free-text contact name, unrelated to the requester's username.
    pub requester_name: String,
    pub phone: String,
    pub email: Email,
    pub message: Option<String>,
    /// Server-assigned, immutable.
    pub created_at: DateTime<Utc>,
}

/// A request together with the pet it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdoptionRequestDetail {
    pub request: AdoptionRequest,
    pub pet: Pet,
}

/// Contact fields supplied by the requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactDetails {
    pub requester_name: String,
    pub phone: String,
    pub email: Email,
    pub message: Option<String>,
}

/// A validated request ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAdoptionRequest {
    pub pet_id: PetId,
    pub requester_id: UserId,
    pub contact: ContactDetails,
}

/// Validated changes to a request's contact fields.
///
/// The pet, requester and creation time are read-only. `message` is
/// doubly optional: `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdoptionRequestChanges {
    pub requester_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Email>,
    pub message: Option<Option<String>>,
}

impl AdoptionRequestChanges {
    /// Apply the changes to a stored request.
    pub fn apply_to(&self, request: &mut AdoptionRequest) {
        if let Some(requester_name) = &self.requester_name {
            request.requester_name.clone_from(requester_name);
        }
        if let Some(phone) = &self.phone {
            request.phone.clone_from(phone);
        }
        if let Some(email) = &self.email {
            request.email = email.clone();
        }
        if let Some(message) = &self.message {
            request.message.clone_from(message);
        }
    }
}

/// Adoption request payload as sent by clients, as raw JSON values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdoptionRequestInput {
    #[serde(alias = "pet")]
    pub pet_id: Option<Value>,
    pub requester_name: Option<Value>,
    pub phone: Option<Value>,
    pub email: Option<Value>,
    pub message: Option<Value>,
}

impl AdoptionRequestInput {
    /// Validate a create payload, returning the target pet and contact fields.
    ///
    /// # Errors
    ///
    /// Returns every field error found, including `pet_id required`.
    pub fn into_new(self) -> Result<(PetId, ContactDetails), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.pet_id.is_none() {
            errors.add("pet_id", PET_ID_REQUIRED);
        }
        let pet_id = errors.check(
            "pet_id",
            self.pet_id.clone(),
            Presence::Optional,
            integer(|id| {
                i32::try_from(id)
                    .map(PetId::new)
                    .map_err(|_| NOT_AN_INTEGER.to_owned())
            }),
        );
        let changes = self.validate_contact(WriteMode::Full, &mut errors);

        if errors.is_empty()
            && let Some(pet_id) = pet_id
            && let AdoptionRequestChanges {
                requester_name: Some(requester_name),
                phone: Some(phone),
                email: Some(email),
                message,
            } = changes
        {
            return Ok((
                pet_id,
                ContactDetails {
                    requester_name,
                    phone,
                    email,
                    message: message.flatten(),
                },
            ));
        }
        Err(errors)
    }

    /// Validate an update payload. Any `pet_id` is ignored.
    ///
    /// # Errors
    ///
    /// Returns every field error found.
    pub fn into_changes(self, mode: WriteMode) -> Result<AdoptionRequestChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let changes = self.validate_contact(mode, &mut errors);
        if errors.is_empty() {
            Ok(changes)
        } else {
            Err(errors)
        }
    }

    fn validate_contact(self, mode: WriteMode, errors: &mut ValidationErrors) -> AdoptionRequestChanges {
        let presence = mode.presence();
        let message = errors.check("message", self.message, Presence::Optional, string(optional_text));
        let blank_is_none = |message: String| Some(message).filter(|m| !m.is_empty());
        AdoptionRequestChanges {
            requester_name: errors.check(
                "requester_name",
                self.requester_name,
                presence,
                string(text(SHORT_TEXT_MAX)),
            ),
            phone: errors.check("phone", self.phone, presence, string(text(PHONE_MAX))),
            email: errors.check("email", self.email, presence, string(email)),
            // A full replacement clears an omitted message
            message: match mode {
                WriteMode::Full => Some(message.and_then(blank_is_none)),
                WriteMode::Partial => message.map(blank_is_none),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::validation::INVALID_EMAIL;

    fn complete_input() -> AdoptionRequestInput {
        AdoptionRequestInput {
            pet_id: Some(json!(4)),
            requester_name: Some(json!("Bea")),
            phone: Some(json!("+33 6 12 34 56")),
            email: Some(json!("bea@example.com")),
            message: Some(json!("We have a garden")),
        }
    }

    #[test]
    fn test_into_new_accepts_complete_payload() {
        let (pet_id, contact) = complete_input().into_new().unwrap();
        assert_eq!(pet_id, PetId::new(4));
        assert_eq!(contact.email.as_str(), "bea@example.com");
        assert_eq!(contact.message.as_deref(), Some("We have a garden"));
    }

    #[test]
    fn test_into_new_requires_pet_id() {
        let input = AdoptionRequestInput {
            pet_id: None,
            ..complete_input()
        };
        let errors = input.into_new().unwrap_err();
        assert_eq!(errors.field("pet_id").unwrap(), [PET_ID_REQUIRED]);
    }

    #[test]
    fn test_into_new_reports_mistyped_pet_id() {
        let input = AdoptionRequestInput {
            pet_id: Some(json!("four")),
            email: Some(json!(["bea@example.com"])),
            ..complete_input()
        };
        let errors = input.into_new().unwrap_err();
        assert_eq!(errors.field("pet_id").unwrap(), [NOT_AN_INTEGER]);
        assert!(errors.field("email").is_some());
    }

    #[test]
    fn test_into_new_validates_contact_fields() {
        let input = AdoptionRequestInput {
            phone: Some(json!("0123456789012345")),
            email: Some(json!("nope")),
            ..complete_input()
        };
        let errors = input.into_new().unwrap_err();
        assert!(errors.field("phone").is_some());
        assert_eq!(errors.field("email").unwrap(), [INVALID_EMAIL]);
    }

    #[test]
    fn test_blank_message_is_stored_as_none() {
        let input = AdoptionRequestInput {
            message: Some(json!("   ")),
            ..complete_input()
        };
        let (_, contact) = input.into_new().unwrap();
        assert_eq!(contact.message, None);
    }

    #[test]
    fn test_full_update_clears_omitted_message() {
        let input = AdoptionRequestInput {
            message: None,
            ..complete_input()
        };
        let changes = input.into_changes(WriteMode::Full).unwrap();
        assert_eq!(changes.message, Some(None));
    }

    #[test]
    fn test_partial_update_keeps_omitted_fields() {
        let input = AdoptionRequestInput {
            phone: Some(json!("555-0100")),
            ..AdoptionRequestInput::default()
        };
        let changes = input.into_changes(WriteMode::Partial).unwrap();
        assert_eq!(changes.phone.as_deref(), Some("555-0100"));
        assert_eq!(changes.requester_name, None);
        assert_eq!(changes.message, None);
    }
}

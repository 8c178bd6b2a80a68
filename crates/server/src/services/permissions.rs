//! Object-level authorization rules.
//!
//! Both rules are pure functions of the caller and the object. Every
//! service calls them before reading or mutating a single object.

use pet_adoption_core::UserId;

use crate::error::AppError;
use crate::models::Pet;

/// What the caller is trying to do with a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    PartialUpdate,
    Delete,
}

impl Action {
    /// Safe actions never change state.
    #[must_use]
    pub const fn is_read(self) -> bool {
        matches!(self, Self::List | Self::Retrieve)
    }
}

/// Owner-or-read-only: anyone may read a pet, only its owner may write it.
#[must_use]
pub fn owner_or_read_only(caller: Option<UserId>, action: Action, pet: &Pet) -> bool {
    action.is_read() || caller == Some(pet.owner_id)
}

/// Pet-owner-only: an adoption request is visible to its pet's owner alone.
#[must_use]
pub fn pet_owner_only(caller: UserId, pet: &Pet) -> bool {
    pet.owner_id == caller
}

/// Enforce [`owner_or_read_only`].
///
/// # Errors
///
/// Returns `AppError::Forbidden` when the rule does not hold.
pub fn ensure_owner_or_read_only(
    caller: Option<UserId>,
    action: Action,
    pet: &Pet,
) -> Result<(), AppError> {
    if owner_or_read_only(caller, action, pet) {
        Ok(())
    } else {
        Err(AppError::permission_denied())
    }
}

/// Enforce [`pet_owner_only`].
///
/// # Errors
///
/// Returns `AppError::Forbidden` when the rule does not hold.
pub fn ensure_pet_owner(caller: UserId, pet: &Pet) -> Result<(), AppError> {
    if pet_owner_only(caller, pet) {
        Ok(())
    } else {
        Err(AppError::permission_denied())
    }
}

#[cfg(test)]
mod tests {
    use pet_adoption_core::{PetId, PetStatus, Species};

    use super::*;

    const OWNER: UserId = UserId::new(1);
    const STRANGER: UserId = UserId::new(2);

    fn pet() -> Pet {
        Pet {
            id: PetId::new(10),
            name: "Mia".to_owned(),
            age: 2,
            species: Species::Cat,
            city: "Lyon".to_owned(),
            photo: "pet_photos/mia.png".to_owned(),
            status: PetStatus::Available,
            description: "Shy".to_owned(),
            owner_id: OWNER,
        }
    }

    #[test]
    fn test_reads_are_open_to_everyone() {
        let pet = pet();
        for action in [Action::List, Action::Retrieve] {
            assert!(owner_or_read_only(None, action, &pet));
            assert!(owner_or_read_only(Some(STRANGER), action, &pet));
        }
    }

    #[test]
    fn test_writes_need_the_owner() {
        let pet = pet();
        for action in [Action::Update, Action::PartialUpdate, Action::Delete] {
            assert!(owner_or_read_only(Some(OWNER), action, &pet));
            assert!(!owner_or_read_only(Some(STRANGER), action, &pet));
            assert!(!owner_or_read_only(None, action, &pet));
        }
    }

    #[test]
    fn test_pet_owner_only_applies_to_reads_too() {
        let pet = pet();
        assert!(pet_owner_only(OWNER, &pet));
        assert!(!pet_owner_only(STRANGER, &pet));
        assert!(matches!(
            ensure_pet_owner(STRANGER, &pet),
            Err(AppError::Forbidden(_))
        ));
    }
}

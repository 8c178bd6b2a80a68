//! Pet listing domain types.

use serde::Deserialize;
use serde_json::Value;

use pet_adoption_core::{PetId, PetStatus, Species, UserId};

use crate::validation::{
    self, Presence, ValidationErrors, WriteMode, choice, integer, non_negative_int, string, text,
};

/// Maximum length of the short text fields (name, city, photo).
pub const SHORT_TEXT_MAX: usize = 100;

/// A pet listed for adoption.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    pub age: i32,
    pub species: Species,
    pub city: String,
    /// Reference to the stored photo, relative to the media root or absolute.
    pub photo: String,
    pub status: PetStatus,
    pub description: String,
    /// Set once at creation, never changed afterwards.
    pub owner_id: UserId,
}

/// A validated pet listing, before it has an id or owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPet {
    pub name: String,
    pub age: i32,
    pub species: Species,
    pub city: String,
    pub photo: String,
    pub status: PetStatus,
    pub description: String,
}

/// Validated changes to a pet. `None` leaves a field as it is.
///
/// Ownership never changes through an update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetChanges {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub species: Option<Species>,
    pub city: Option<String>,
    pub photo: Option<String>,
    pub status: Option<PetStatus>,
    pub description: Option<String>,
}

impl PetChanges {
    /// Apply the changes to a stored pet.
    pub fn apply_to(&self, pet: &mut Pet) {
        if let Some(name) = &self.name {
            pet.name.clone_from(name);
        }
        if let Some(age) = self.age {
            pet.age = age;
        }
        if let Some(species) = self.species {
            pet.species = species;
        }
        if let Some(city) = &self.city {
            pet.city.clone_from(city);
        }
        if let Some(photo) = &self.photo {
            pet.photo.clone_from(photo);
        }
        if let Some(status) = self.status {
            pet.status = status;
        }
        if let Some(description) = &self.description {
            pet.description.clone_from(description);
        }
    }
}

/// Exact-match list filters; `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetFilter {
    pub species: Option<Species>,
    pub city: Option<String>,
    pub status: Option<PetStatus>,
}

impl PetFilter {
    /// Whether `pet` satisfies every filter that is set.
    #[must_use]
    pub fn matches(&self, pet: &Pet) -> bool {
        self.species.is_none_or(|species| pet.species == species)
            && self.city.as_deref().is_none_or(|city| pet.city == city)
            && self.status.is_none_or(|status| pet.status == status)
    }
}

/// Pet payload as sent by clients.
///
/// Values stay raw JSON until validation so a mistyped field is reported
/// under its own name. Unknown keys such as `owner` or `id` are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PetInput {
    pub name: Option<Value>,
    pub age: Option<Value>,
    pub species: Option<Value>,
    pub city: Option<Value>,
    pub photo: Option<Value>,
    pub status: Option<Value>,
    pub description: Option<Value>,
}

impl PetInput {
    /// Validate a payload for creating a listing.
    ///
    /// # Errors
    ///
    /// Returns every field error found.
    pub fn into_new_pet(self) -> Result<NewPet, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let changes = self.validate(WriteMode::Full, &mut errors);

        if errors.is_empty()
            && let PetChanges {
                name: Some(name),
                age: Some(age),
                species: Some(species),
                city: Some(city),
                photo: Some(photo),
                status,
                description: Some(description),
            } = changes
        {
            return Ok(NewPet {
                name,
                age,
                species,
                city,
                photo,
                status: status.unwrap_or_default(),
                description,
            });
        }
        Err(errors)
    }

    /// Validate a payload for `PUT` (`Full`) or `PATCH` (`Partial`).
    ///
    /// # Errors
    ///
    /// Returns every field error found.
    pub fn into_changes(self, mode: WriteMode) -> Result<PetChanges, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let changes = self.validate(mode, &mut errors);
        if errors.is_empty() {
            Ok(changes)
        } else {
            Err(errors)
        }
    }

    fn validate(self, mode: WriteMode, errors: &mut ValidationErrors) -> PetChanges {
        let presence = mode.presence();
        PetChanges {
            name: errors.check("name", self.name, presence, string(text(SHORT_TEXT_MAX))),
            age: errors.check("age", self.age, presence, integer(non_negative_int)),
            species: errors.check("species", self.species, presence, string(choice::<Species>)),
            city: errors.check("city", self.city, presence, string(text(SHORT_TEXT_MAX))),
            photo: errors.check("photo", self.photo, presence, string(text(SHORT_TEXT_MAX))),
            // Has a default, so never required
            status: errors.check(
                "status",
                self.status,
                Presence::Optional,
                string(choice::<PetStatus>),
            ),
            description: errors.check(
                "description",
                self.description,
                presence,
                string(text(usize::MAX)),
            ),
        }
    }
}

/// Build a [`PetFilter`] from raw query parameters.
///
/// Empty parameters (`?species=`) impose nothing.
///
/// # Errors
///
/// Returns a field error for an unknown species or status.
pub fn parse_filter(
    species: Option<String>,
    city: Option<String>,
    status: Option<String>,
) -> Result<PetFilter, ValidationErrors> {
    let [species, city, status] = [species, city, status].map(|v| v.filter(|v| !v.is_empty()));
    let mut errors = ValidationErrors::new();
    let species = errors.check("species", species, Presence::Optional, filter_choice::<Species>);
    let status = errors.check("status", status, Presence::Optional, filter_choice::<PetStatus>);
    if errors.is_empty() {
        Ok(PetFilter {
            species,
            city,
            status,
        })
    } else {
        Err(errors)
    }
}

fn filter_choice<T>(value: String) -> Result<T, String>
where
    T: std::str::FromStr<Err = pet_adoption_core::InvalidChoice>,
{
    validation::choice::<T>(value.clone()).map_err(|_| {
        format!("Select a valid choice. {value} is not one of the available choices.")
    })
}

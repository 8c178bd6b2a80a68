//! Pet listing operations.

use pet_adoption_core::PetId;

use super::permissions::{Action, ensure_owner_or_read_only};
use crate::db::PetRepository;
use crate::error::{AppError, Result};
use crate::models::{CurrentUser, Pet, PetFilter, PetInput};
use crate::validation::WriteMode;

/// Pet listing service.
///
/// Reads are open to anonymous callers. Writes take the authenticated
/// caller and are checked against the owner-or-read-only rule.
pub struct PetService<'a> {
    pets: &'a dyn PetRepository,
}

impl<'a> PetService<'a> {
    #[must_use]
    pub const fn new(pets: &'a dyn PetRepository) -> Self {
        Self { pets }
    }

    /// Pets matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the lookup fails.
    pub async fn list(&self, filter: &PetFilter) -> Result<Vec<Pet>> {
        Ok(self.pets.list(filter).await?)
    }

    /// A single pet.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if there is no such pet.
    pub async fn retrieve(&self, caller: Option<&CurrentUser>, id: PetId) -> Result<Pet> {
        let pet = self.pets.get(id).await?.ok_or(AppError::NotFound)?;
        ensure_owner_or_read_only(caller.map(|c| c.id), Action::Retrieve, &pet)?;
        Ok(pet)
    }

    /// List a new pet owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the payload is invalid.
    pub async fn create(&self, caller: &CurrentUser, input: PetInput) -> Result<Pet> {
        let new_pet = input.into_new_pet()?;
        let pet = self.pets.create(caller.id, &new_pet).await?;
        tracing::info!(pet_id = %pet.id, owner_id = %caller.id, "Pet listed");
        Ok(pet)
    }

    /// Replace every writable field of a pet.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` unless the caller owns the pet.
    /// Returns `AppError::Validation` if the payload is invalid.
    pub async fn update(&self, caller: &CurrentUser, id: PetId, input: PetInput) -> Result<Pet> {
        self.write(caller, id, input, WriteMode::Full).await
    }

    /// Change only the supplied fields of a pet.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` unless the caller owns the pet.
    /// Returns `AppError::Validation` if the payload is invalid.
    pub async fn partial_update(
        &self,
        caller: &CurrentUser,
        id: PetId,
        input: PetInput,
    ) -> Result<Pet> {
        self.write(caller, id, input, WriteMode::Partial).await
    }

    /// Remove a pet and every adoption request made for it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` unless the caller owns the pet.
    pub async fn delete(&self, caller: &CurrentUser, id: PetId) -> Result<()> {
        self.owned_pet(caller, id, Action::Delete).await?;
        if !self.pets.delete(id).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!(pet_id = %id, owner_id = %caller.id, "Pet deleted");
        Ok(())
    }

    async fn write(
        &self,
        caller: &CurrentUser,
        id: PetId,
        input: PetInput,
        mode: WriteMode,
    ) -> Result<Pet> {
        let action = match mode {
            WriteMode::Full => Action::Update,
            WriteMode::Partial => Action::PartialUpdate,
        };
        self.owned_pet(caller, id, action).await?;
        let changes = input.into_changes(mode)?;
        let pet = self
            .pets
            .update(id, &changes)
            .await?
            .ok_or(AppError::NotFound)?;
        tracing::info!(pet_id = %pet.id, owner_id = %caller.id, "Pet updated");
        Ok(pet)
    }

    /// Load a pet for a write. A missing pet is reported like a foreign one.
    async fn owned_pet(&self, caller: &CurrentUser, id: PetId, action: Action) -> Result<Pet> {
        let pet = self
            .pets
            .get(id)
            .await?
            .ok_or_else(AppError::permission_denied)?;
        ensure_owner_or_read_only(Some(caller.id), action, &pet)?;
        Ok(pet)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pet_adoption_core::{PetStatus, Species, UserId, Username};
    use serde_json::json;

    use super::*;
    use crate::db::MemoryStore;

    fn caller(id: i32, name: &str) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            username: Username::parse(name).unwrap(),
        }
    }

    fn input(name: &str, species: &str, city: &str) -> PetInput {
        PetInput {
            name: Some(json!(name)),
            age: Some(json!(2)),
            species: Some(json!(species)),
            city: Some(json!(city)),
            photo: Some(json!("pet_photos/p.jpg")),
            status: None,
            description: Some(json!("Friendly")),
        }
    }

    #[tokio::test]
    async fn test_create_sets_owner_to_caller() {
        let store = MemoryStore::new();
        let service = PetService::new(&store);
        let alice = caller(1, "alice");

        let pet = service.create(&alice, input("Rex", "dog", "Paris")).await.unwrap();
        assert_eq!(pet.owner_id, alice.id);
        assert_eq!(pet.status, PetStatus::Available);
        assert_eq!(service.retrieve(None, pet.id).await.unwrap(), pet);
    }

    #[tokio::test]
    async fn test_list_applies_filters() {
        let store = MemoryStore::new();
        let service = PetService::new(&store);
        let alice = caller(1, "alice");
        service.create(&alice, input("Rex", "dog", "Paris")).await.unwrap();
        service.create(&alice, input("Mia", "cat", "Paris")).await.unwrap();
        service.create(&alice, input("Tom", "cat", "Lyon")).await.unwrap();

        let filter = PetFilter {
            species: Some(Species::Cat),
            city: Some("Paris".to_owned()),
            status: None,
        };
        let pets = service.list(&filter).await.unwrap();
        assert_eq!(pets.len(), 1);
        assert_eq!(pets[0].name, "Mia");
        assert_eq!(service.list(&PetFilter::default()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_non_owner_cannot_write() {
        let store = MemoryStore::new();
        let service = PetService::new(&store);
        let alice = caller(1, "alice");
        let bob = caller(2, "bob");
        let pet = service.create(&alice, input("Rex", "dog", "Paris")).await.unwrap();

        let err = service
            .partial_update(&bob, pet.id, PetInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = service.delete(&bob, pet.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_missing_pet_write_is_forbidden() {
        let store = MemoryStore::new();
        let service = PetService::new(&store);
        let err = service
            .delete(&caller(1, "alice"), PetId::new(404))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = service.retrieve(None, PetId::new(404)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn test_ownership_is_checked_before_the_payload() {
        let store = MemoryStore::new();
        let service = PetService::new(&store);
        let alice = caller(1, "alice");
        let bob = caller(2, "bob");
        let pet = service.create(&alice, input("Rex", "dog", "Paris")).await.unwrap();
        let mistyped = || PetInput {
            age: Some(json!("old")),
            ..PetInput::default()
        };

        let err = service.partial_update(&bob, pet.id, mistyped()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = service
            .partial_update(&bob, PetId::new(404), mistyped())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = service.partial_update(&alice, pet.id, mistyped()).await.unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(errors.field("age").unwrap(), [crate::validation::NOT_AN_INTEGER]);
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let store = MemoryStore::new();
        let service = PetService::new(&store);
        let alice = caller(1, "alice");
        let pet = service.create(&alice, input("Rex", "dog", "Paris")).await.unwrap();

        let changes = PetInput {
            status: Some(json!("adopted")),
            ..PetInput::default()
        };
        let updated = service.partial_update(&alice, pet.id, changes).await.unwrap();
        assert_eq!(updated.status, PetStatus::Adopted);
        assert_eq!(updated.name, "Rex");
        assert_eq!(updated.owner_id, alice.id);
    }

    #[tokio::test]
    async fn test_full_update_requires_every_field() {
        let store = MemoryStore::new();
        let service = PetService::new(&store);
        let alice = caller(1, "alice");
        let pet = service.create(&alice, input("Rex", "dog", "Paris")).await.unwrap();

        let err = service
            .update(&alice, pet.id, PetInput::default())
            .await
            .unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert!(errors.field("name").is_some());
    }
}

//! Adoption request operations.
//!
//! Every operation needs an authenticated caller and only ever sees
//! requests made for the caller's own pets. The requester of a request
//! cannot read, change or withdraw it.

use pet_adoption_core::AdoptionRequestId;

use super::permissions::ensure_pet_owner;
use crate::db::adoption_requests::DUPLICATE_REQUEST;
use crate::db::{AdoptionRequestRepository, PetRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::models::{AdoptionRequestDetail, AdoptionRequestInput, CurrentUser, NewAdoptionRequest};
use crate::validation::WriteMode;

pub const OWN_PET: &str = "cannot request your own pet";

/// Adoption request service.
pub struct AdoptionRequestService<'a> {
    pets: &'a dyn PetRepository,
    requests: &'a dyn AdoptionRequestRepository,
}

impl<'a> AdoptionRequestService<'a> {
    #[must_use]
    pub const fn new(
        pets: &'a dyn PetRepository,
        requests: &'a dyn AdoptionRequestRepository,
    ) -> Self {
        Self { pets, requests }
    }

    /// Requests made for the caller's pets.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Database` if the lookup fails.
    pub async fn list(&self, caller: &CurrentUser) -> Result<Vec<AdoptionRequestDetail>> {
        Ok(self.requests.list_for_owner(caller.id).await?)
    }

    /// A single request.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the request does not exist or is
    /// for someone else's pet.
    pub async fn retrieve(
        &self,
        caller: &CurrentUser,
        id: AdoptionRequestId,
    ) -> Result<AdoptionRequestDetail> {
        self.visible(caller, id).await
    }

    /// Submit a request for someone else's pet.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a bad payload, the caller's own
    /// pet, or a second request for the same pet.
    /// Returns `AppError::NotFound` if the pet does not exist.
    pub async fn create(
        &self,
        caller: &CurrentUser,
        input: AdoptionRequestInput,
    ) -> Result<AdoptionRequestDetail> {
        let (pet_id, contact) = input.into_new()?;
        let pet = self.pets.get(pet_id).await?.ok_or(AppError::NotFound)?;

        if pet.owner_id == caller.id {
            return Err(AppError::non_field(OWN_PET));
        }
        if self.requests.exists(pet.id, caller.id).await? {
            return Err(AppError::non_field(DUPLICATE_REQUEST));
        }

        let new_request = NewAdoptionRequest {
            pet_id: pet.id,
            requester_id: caller.id,
            contact,
        };
        // The unique constraint catches a concurrent duplicate
        let request = self
            .requests
            .create(&new_request)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AppError::non_field(DUPLICATE_REQUEST),
                RepositoryError::NotFound => AppError::NotFound,
                other => AppError::Database(other),
            })?;

        tracing::info!(
            request_id = %request.id,
            pet_id = %pet.id,
            requester_id = %caller.id,
            "Adoption request submitted"
        );
        Ok(AdoptionRequestDetail { request, pet })
    }

    /// Replace the contact fields of a request.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the request is not visible to the caller.
    /// Returns `AppError::Validation` if the payload is invalid.
    pub async fn update(
        &self,
        caller: &CurrentUser,
        id: AdoptionRequestId,
        input: AdoptionRequestInput,
    ) -> Result<AdoptionRequestDetail> {
        self.write(caller, id, input, WriteMode::Full).await
    }

    /// Change only the supplied contact fields of a request.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the request is not visible to the caller.
    /// Returns `AppError::Validation` if the payload is invalid.
    pub async fn partial_update(
        &self,
        caller: &CurrentUser,
        id: AdoptionRequestId,
        input: AdoptionRequestInput,
    ) -> Result<AdoptionRequestDetail> {
        self.write(caller, id, input, WriteMode::Partial).await
    }

    /// Discard a request.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the request is not visible to the caller.
    pub async fn delete(&self, caller: &CurrentUser, id: AdoptionRequestId) -> Result<()> {
        self.visible(caller, id).await?;
        if !self.requests.delete(id).await? {
            return Err(AppError::NotFound);
        }
        tracing::info!(request_id = %id, owner_id = %caller.id, "Adoption request removed");
        Ok(())
    }

    async fn write(
        &self,
        caller: &CurrentUser,
        id: AdoptionRequestId,
        input: AdoptionRequestInput,
        mode: WriteMode,
    ) -> Result<AdoptionRequestDetail> {
        let AdoptionRequestDetail { pet, .. } = self.visible(caller, id).await?;
        let changes = input.into_changes(mode)?;
        let request = self
            .requests
            .update(id, &changes)
            .await?
            .ok_or(AppError::NotFound)?;
        tracing::info!(request_id = %id, owner_id = %caller.id, "Adoption request updated");
        Ok(AdoptionRequestDetail { request, pet })
    }

    /// Load a request scoped to the caller's pets and re-check the rule.
    async fn visible(
        &self,
        caller: &CurrentUser,
        id: AdoptionRequestId,
    ) -> Result<AdoptionRequestDetail> {
        let detail = self
            .requests
            .get_for_owner(id, caller.id)
            .await?
            .ok_or(AppError::NotFound)?;
        ensure_pet_owner(caller.id, &detail.pet)?;
        Ok(detail)
    }
}

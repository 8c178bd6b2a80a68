//! In-process record store.
//!
//! All tables sit behind one mutex so the pet delete cascade and the
//! (pet, requester) uniqueness rule are applied atomically, the same way
//! the `PostgreSQL` constraints apply them.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use pet_adoption_core::{AdoptionRequestId, AuthToken, PetId, UserId, Username};

use super::adoption_requests::DUPLICATE_REQUEST;
use super::{AdoptionRequestRepository, PetRepository, RepositoryError, UserRepository};
use crate::models::{
    AdoptionRequest, AdoptionRequestChanges, AdoptionRequestDetail, NewAdoptionRequest, NewPet,
    NewUser, Pet, PetChanges, PetFilter, User,
};

#[derive(Debug, Default)]
struct Tables {
    last_user_id: i32,
    last_pet_id: i32,
    last_request_id: i32,
    users: BTreeMap<UserId, (User, String)>,
    tokens: BTreeMap<UserId, AuthToken>,
    pets: BTreeMap<PetId, Pet>,
    requests: BTreeMap<AdoptionRequestId, AdoptionRequest>,
}

impl Tables {
    fn detail(&self, request: &AdoptionRequest) -> Result<AdoptionRequestDetail, RepositoryError> {
        let pet = self.pets.get(&request.pet_id).ok_or_else(|| {
            RepositoryError::DataCorruption(format!(
                "adoption request {} references missing pet {}",
                request.id, request.pet_id
            ))
        })?;
        Ok(AdoptionRequestDetail {
            request: request.clone(),
            pet: pet.clone(),
        })
    }

    fn is_owned_by(&self, request: &AdoptionRequest, owner: UserId) -> bool {
        self.pets
            .get(&request.pet_id)
            .is_some_and(|pet| pet.owner_id == owner)
    }
}

/// Record store kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // No operation leaves the tables half-written, so a poisoned lock is still usable
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(
        &self,
        new_user: &NewUser,
        token: &AuthToken,
    ) -> Result<User, RepositoryError> {
        let mut tables = self.tables();
        if tables
            .users
            .values()
            .any(|(user, _)| user.username == new_user.username)
        {
            return Err(RepositoryError::Conflict(
                "username already exists".to_owned(),
            ));
        }

        tables.last_user_id += 1;
        let user = User {
            id: UserId::new(tables.last_user_id),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            date_joined: Utc::now(),
        };
        tables
            .users
            .insert(user.id, (user.clone(), new_user.password_hash.clone()));
        tables.tokens.insert(user.id, token.clone());
        Ok(user)
    }

    async fn get_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        Ok(self
            .tables()
            .users
            .values()
            .find(|(user, _)| &user.username == username)
            .cloned())
    }

    async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables().users.get(&id).map(|(user, _)| user.clone()))
    }

    async fn token_for_user(
        &self,
        user_id: UserId,
        candidate: &AuthToken,
    ) -> Result<AuthToken, RepositoryError> {
        let mut tables = self.tables();
        if !tables.users.contains_key(&user_id) {
            return Err(RepositoryError::NotFound);
        }
        Ok(tables
            .tokens
            .entry(user_id)
            .or_insert_with(|| candidate.clone())
            .clone())
    }

    async fn get_by_token(&self, token: &AuthToken) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables();
        let user = tables
            .tokens
            .iter()
            .find(|(_, key)| *key == token)
            .and_then(|(user_id, _)| tables.users.get(user_id))
            .map(|(user, _)| user.clone());
        Ok(user)
    }
}

#[async_trait]
impl PetRepository for MemoryStore {
    async fn list(&self, filter: &PetFilter) -> Result<Vec<Pet>, RepositoryError> {
        Ok(self
            .tables()
            .pets
            .values()
            .filter(|pet| filter.matches(pet))
            .cloned()
            .collect())
    }

    async fn get(&self, id: PetId) -> Result<Option<Pet>, RepositoryError> {
        Ok(self.tables().pets.get(&id).cloned())
    }

    async fn create(&self, owner: UserId, new_pet: &NewPet) -> Result<Pet, RepositoryError> {
        let mut tables = self.tables();
        tables.last_pet_id += 1;
        let pet = Pet {
            id: PetId::new(tables.last_pet_id),
            name: new_pet.name.clone(),
            age: new_pet.age,
            species: new_pet.species,
            city: new_pet.city.clone(),
            photo: new_pet.photo.clone(),
            status: new_pet.status,
            description: new_pet.description.clone(),
            owner_id: owner,
        };
        tables.pets.insert(pet.id, pet.clone());
        Ok(pet)
    }

    async fn update(
        &self,
        id: PetId,
        changes: &PetChanges,
    ) -> Result<Option<Pet>, RepositoryError> {
        let mut tables = self.tables();
        Ok(tables.pets.get_mut(&id).map(|pet| {
            changes.apply_to(pet);
            pet.clone()
        }))
    }

    async fn delete(&self, id: PetId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables();
        if tables.pets.remove(&id).is_none() {
            return Ok(false);
        }
        tables.requests.retain(|_, request| request.pet_id != id);
        Ok(true)
    }
}

#[async_trait]
impl AdoptionRequestRepository for MemoryStore {
    async fn list_for_owner(
        &self,
        owner: UserId,
    ) -> Result<Vec<AdoptionRequestDetail>, RepositoryError> {
        let tables = self.tables();
        tables
            .requests
            .values()
            .filter(|request| tables.is_owned_by(request, owner))
            .map(|request| tables.detail(request))
            .collect()
    }

    async fn get_for_owner(
        &self,
        id: AdoptionRequestId,
        owner: UserId,
    ) -> Result<Option<AdoptionRequestDetail>, RepositoryError> {
        let tables = self.tables();
        tables
            .requests
            .get(&id)
            .filter(|request| tables.is_owned_by(request, owner))
            .map(|request| tables.detail(request))
            .transpose()
    }

    async fn exists(&self, pet: PetId, requester: UserId) -> Result<bool, RepositoryError> {
        Ok(self
            .tables()
            .requests
            .values()
            .any(|request| request.pet_id == pet && request.requester_id == requester))
    }

    async fn create(
        &self,
        new_request: &NewAdoptionRequest,
    ) -> Result<AdoptionRequest, RepositoryError> {
        let mut tables = self.tables();
        if !tables.pets.contains_key(&new_request.pet_id) {
            return Err(RepositoryError::NotFound);
        }
        if tables.requests.values().any(|request| {
            request.pet_id == new_request.pet_id && request.requester_id == new_request.requester_id
        }) {
            return Err(RepositoryError::Conflict(DUPLICATE_REQUEST.to_owned()));
        }

        tables.last_request_id += 1;
        let contact = &new_request.contact;
        let request = AdoptionRequest {
            id: AdoptionRequestId::new(tables.last_request_id),
            pet_id: new_request.pet_id,
            requester_id: new_request.requester_id,
            requester_name: contact.requester_name.clone(),
            phone: contact.phone.clone(),
            email: contact.email.clone(),
            message: contact.message.clone(),
            created_at: Utc::now(),
        };
        tables.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn update(
        &self,
        id: AdoptionRequestId,
        changes: &AdoptionRequestChanges,
    ) -> Result<Option<AdoptionRequest>, RepositoryError> {
        let mut tables = self.tables();
        Ok(tables.requests.get_mut(&id).map(|request| {
            changes.apply_to(request);
            request.clone()
        }))
    }

    async fn delete(&self, id: AdoptionRequestId) -> Result<bool, RepositoryError> {
        Ok(self.tables().requests.remove(&id).is_some())
    }
}

//! `PostgreSQL` repository for pet listings.

use async_trait::async_trait;
use sqlx::PgPool;

use pet_adoption_core::{PetId, UserId};

use super::{PetRepository, RepositoryError};
use crate::models::{NewPet, Pet, PetChanges, PetFilter};

/// Pet repository backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgPetRepository {
    pool: PgPool,
}

impl PgPetRepository {
    /// Create a new pet repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PetRepository for PgPetRepository {
    async fn list(&self, filter: &PetFilter) -> Result<Vec<Pet>, RepositoryError> {
        // NULL parameters match every row
        let pets = sqlx::query_as::<_, Pet>(
            r"
            SELECT id, name, age, species, city, photo, status, description, owner_id
            FROM adoption.pet
            WHERE ($1::text IS NULL OR species = $1)
              AND ($2::text IS NULL OR city = $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY id
            ",
        )
        .bind(filter.species)
        .bind(filter.city.as_deref())
        .bind(filter.status)
        .fetch_all(&self.pool)
        .await?;

        Ok(pets)
    }

    async fn get(&self, id: PetId) -> Result<Option<Pet>, RepositoryError> {
        let pet = sqlx::query_as::<_, Pet>(
            r"
            SELECT id, name, age, species, city, photo, status, description, owner_id
            FROM adoption.pet
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(pet)
    }

    async fn create(&self, owner: UserId, pet: &NewPet) -> Result<Pet, RepositoryError> {
        let pet = sqlx::query_as::<_, Pet>(
            r"
            INSERT INTO adoption.pet
                (name, age, species, city, photo, status, description, owner_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, age, species, city, photo, status, description, owner_id
            ",
        )
        .bind(&pet.name)
        .bind(pet.age)
        .bind(pet.species)
        .bind(&pet.city)
        .bind(&pet.photo)
        .bind(pet.status)
        .bind(&pet.description)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        Ok(pet)
    }

    async fn update(
        &self,
        id: PetId,
        changes: &PetChanges,
    ) -> Result<Option<Pet>, RepositoryError> {
        let pet = sqlx::query_as::<_, Pet>(
            r"
            UPDATE adoption.pet
            SET name = COALESCE($2, name),
                age = COALESCE($3, age),
                species = COALESCE($4, species),
                city = COALESCE($5, city),
                photo = COALESCE($6, photo),
                status = COALESCE($7, status),
                description = COALESCE($8, description)
            WHERE id = $1
            RETURNING id, name, age, species, city, photo, status, description, owner_id
            ",
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.age)
        .bind(changes.species)
        .bind(changes.city.as_deref())
        .bind(changes.photo.as_deref())
        .bind(changes.status)
        .bind(changes.description.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(pet)
    }

    async fn delete(&self, id: PetId) -> Result<bool, RepositoryError> {
        // adoption_request rows go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM adoption.pet WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

//! `PostgreSQL` repository for adoption requests.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Row};

use pet_adoption_core::{AdoptionRequestId, PetId, UserId};

use super::{AdoptionRequestRepository, RepositoryError, constraint_error};
use crate::models::{
    AdoptionRequest, AdoptionRequestChanges, AdoptionRequestDetail, NewAdoptionRequest, Pet,
};

/// Duplicate (pet, requester) pairs surface with this conflict message.
pub const DUPLICATE_REQUEST: &str = "duplicate request";

const DETAIL_SELECT: &str = r"
    SELECT r.id, r.pet_id, r.requester_id, r.requester_name, r.phone, r.email,
           r.message, r.created_at,
           p.name AS pet_name, p.age AS pet_age, p.species AS pet_species,
           p.city AS pet_city, p.photo AS pet_photo, p.status AS pet_status,
           p.description AS pet_description, p.owner_id AS pet_owner_id
    FROM adoption.adoption_request r
    JOIN adoption.pet p ON p.id = r.pet_id
";

/// A request joined with its pet.
struct DetailRow(AdoptionRequestDetail);

impl<'r> FromRow<'r, PgRow> for DetailRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let request = AdoptionRequest::from_row(row)?;
        let pet = Pet {
            id: request.pet_id,
            name: row.try_get("pet_name")?,
            age: row.try_get("pet_age")?,
            species: row.try_get("pet_species")?,
            city: row.try_get("pet_city")?,
            photo: row.try_get("pet_photo")?,
            status: row.try_get("pet_status")?,
            description: row.try_get("pet_description")?,
            owner_id: row.try_get("pet_owner_id")?,
        };
        Ok(Self(AdoptionRequestDetail { request, pet }))
    }
}

/// Adoption request repository backed by `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgAdoptionRequestRepository {
    pool: PgPool,
}

impl PgAdoptionRequestRepository {
    /// Create a new adoption request repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdoptionRequestRepository for PgAdoptionRequestRepository {
    async fn list_for_owner(
        &self,
        owner: UserId,
    ) -> Result<Vec<AdoptionRequestDetail>, RepositoryError> {
        let sql = format!("{DETAIL_SELECT} WHERE p.owner_id = $1 ORDER BY r.id");
        let rows = sqlx::query_as::<_, DetailRow>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|DetailRow(detail)| detail).collect())
    }

    async fn get_for_owner(
        &self,
        id: AdoptionRequestId,
        owner: UserId,
    ) -> Result<Option<AdoptionRequestDetail>, RepositoryError> {
        let sql = format!("{DETAIL_SELECT} WHERE r.id = $1 AND p.owner_id = $2");
        let row = sqlx::query_as::<_, DetailRow>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|DetailRow(detail)| detail))
    }

    async fn exists(&self, pet: PetId, requester: UserId) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (
                SELECT 1 FROM adoption.adoption_request
                WHERE pet_id = $1 AND requester_id = $2
            )
            ",
        )
        .bind(pet)
        .bind(requester)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create(
        &self,
        request: &NewAdoptionRequest,
    ) -> Result<AdoptionRequest, RepositoryError> {
        let contact = &request.contact;
        let created = sqlx::query_as::<_, AdoptionRequest>(
            r"
            INSERT INTO adoption.adoption_request
                (pet_id, requester_id, requester_name, phone, email, message)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, pet_id, requester_id, requester_name, phone, email,
                      message, created_at
            ",
        )
        .bind(request.pet_id)
        .bind(request.requester_id)
        .bind(&contact.requester_name)
        .bind(&contact.phone)
        .bind(&contact.email)
        .bind(contact.message.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, DUPLICATE_REQUEST))?;

        Ok(created)
    }

    async fn update(
        &self,
        id: AdoptionRequestId,
        changes: &AdoptionRequestChanges,
    ) -> Result<Option<AdoptionRequest>, RepositoryError> {
        // $5 says whether the message is being replaced (possibly by NULL)
        let updated = sqlx::query_as::<_, AdoptionRequest>(
            r"
            UPDATE adoption.adoption_request
            SET requester_name = COALESCE($2, requester_name),
                phone = COALESCE($3, phone),
                email = COALESCE($4, email),
                message = CASE WHEN $5 THEN $6 ELSE message END
            WHERE id = $1
            RETURNING id, pet_id, requester_id, requester_name, phone, email,
                      message, created_at
            ",
        )
        .bind(id)
        .bind(changes.requester_name.as_deref())
        .bind(changes.phone.as_deref())
        .bind(changes.email.as_ref())
        .bind(changes.message.is_some())
        .bind(changes.message.clone().flatten())
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    async fn delete(&self, id: AdoptionRequestId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM adoption.adoption_request WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

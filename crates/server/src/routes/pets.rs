//! Pet route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use pet_adoption_core::{PetId, PetStatus, Species, UserId};

use crate::error::Result;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::pet::parse_filter;
use crate::models::{Pet, PetInput};
use crate::services::PetService;
use crate::state::AppState;

/// List filters.
#[derive(Debug, Default, Deserialize)]
pub struct PetQuery {
    pub species: Option<String>,
    pub city: Option<String>,
    pub status: Option<String>,
}

/// A pet as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct PetResponse {
    pub id: PetId,
    pub name: String,
    pub age: i32,
    pub species: Species,
    pub city: String,
    pub photo: String,
    /// `photo` resolved against the media base URL.
    pub photo_url: Option<String>,
    pub status: PetStatus,
    pub description: String,
    pub owner: UserId,
}

impl PetResponse {
    #[must_use]
    pub fn new(pet: Pet, media_base_url: &Url) -> Self {
        let photo_url = photo_url(media_base_url, &pet.photo);
        Self {
            id: pet.id,
            name: pet.name,
            age: pet.age,
            species: pet.species,
            city: pet.city,
            photo: pet.photo,
            photo_url,
            status: pet.status,
            description: pet.description,
            owner: pet.owner_id,
        }
    }
}

/// Absolute http(s) photo references are kept, anything else joins the media root.
fn photo_url(media_base_url: &Url, photo: &str) -> Option<String> {
    if let Ok(absolute) = Url::parse(photo)
        && matches!(absolute.scheme(), "http" | "https")
    {
        return Some(absolute.into());
    }
    // Without the "./" a colon in the first segment would parse as a scheme
    let reference = if photo.starts_with('/') {
        photo.to_owned()
    } else {
        format!("./{photo}")
    };
    media_base_url.join(&reference).ok().map(Into::into)
}

/// List pets, optionally filtered by species, city and status.
pub async fn list(
    State(state): State<AppState>,
    OptionalAuth(_caller): OptionalAuth,
    ApiQuery(query): ApiQuery<PetQuery>,
) -> Result<Json<Vec<PetResponse>>> {
    let filter = parse_filter(query.species, query.city, query.status)?;
    let pets = PetService::new(state.repositories().pets.as_ref())
        .list(&filter)
        .await?;

    let base = &state.config().media_base_url;
    Ok(Json(
        pets.into_iter()
            .map(|pet| PetResponse::new(pet, base))
            .collect(),
    ))
}

/// Show one pet.
pub async fn retrieve(
    State(state): State<AppState>,
    OptionalAuth(caller): OptionalAuth,
    ApiPath(id): ApiPath<PetId>,
) -> Result<Json<PetResponse>> {
    let pet = PetService::new(state.repositories().pets.as_ref())
        .retrieve(caller.as_ref(), id)
        .await?;
    Ok(Json(PetResponse::new(pet, &state.config().media_base_url)))
}

/// List a pet owned by the caller.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiJson(input): ApiJson<PetInput>,
) -> Result<(StatusCode, Json<PetResponse>)> {
    let pet = PetService::new(state.repositories().pets.as_ref())
        .create(&caller, input)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(PetResponse::new(pet, &state.config().media_base_url)),
    ))
}

/// Replace a pet (`PUT`).
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiPath(id): ApiPath<PetId>,
    ApiJson(input): ApiJson<PetInput>,
) -> Result<Json<PetResponse>> {
    let pet = PetService::new(state.repositories().pets.as_ref())
        .update(&caller, id, input)
        .await?;
    Ok(Json(PetResponse::new(pet, &state.config().media_base_url)))
}

/// Change some fields of a pet (`PATCH`).
pub async fn partial_update(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiPath(id): ApiPath<PetId>,
    ApiJson(input): ApiJson<PetInput>,
) -> Result<Json<PetResponse>> {
    let pet = PetService::new(state.repositories().pets.as_ref())
        .partial_update(&caller, id, input)
        .await?;
    Ok(Json(PetResponse::new(pet, &state.config().media_base_url)))
}

/// Delete a pet and its adoption requests.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiPath(id): ApiPath<PetId>,
) -> Result<StatusCode> {
    PetService::new(state.repositories().pets.as_ref())
        .delete(&caller, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_url_joins_relative_reference() {
        let base = Url::parse("https://cdn.example.com/media/").unwrap();
        assert_eq!(
            photo_url(&base, "pet_photos/rex.jpg").as_deref(),
            Some("https://cdn.example.com/media/pet_photos/rex.jpg")
        );
    }

    #[test]
    fn test_photo_url_keeps_absolute_reference() {
        let base = Url::parse("https://cdn.example.com/media/").unwrap();
        assert_eq!(
            photo_url(&base, "https://images.example.org/rex.jpg").as_deref(),
            Some("https://images.example.org/rex.jpg")
        );
    }

    #[test]
    fn test_photo_url_joins_reference_with_colon() {
        let base = Url::parse("https://cdn.example.com/media/").unwrap();
        assert_eq!(
            photo_url(&base, "rex:1.jpg").as_deref(),
            Some("https://cdn.example.com/media/rex:1.jpg")
        );
        assert_eq!(
            photo_url(&base, "mailto:rex@example.com").as_deref(),
            Some("https://cdn.example.com/media/mailto:rex@example.com")
        );
    }
}

//! Adoption request route handlers.
//!
//! Every route requires authentication and only exposes requests made
//! for the caller's own pets.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use url::Url;

use pet_adoption_core::{AdoptionRequestId, Email, UserId};

use super::pets::PetResponse;
use crate::error::Result;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAuth;
use crate::models::{AdoptionRequestDetail, AdoptionRequestInput};
use crate::services::AdoptionRequestService;
use crate::state::AppState;

/// An adoption request as returned by the API, with its pet nested.
#[derive(Debug, Clone, Serialize)]
pub struct AdoptionRequestResponse {
    pub id: AdoptionRequestId,
    pub pet: PetResponse,
    pub requester: UserId,
    pub requester_name: String,
    pub phone: String,
    pub email: Email,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AdoptionRequestResponse {
    #[must_use]
    pub fn new(detail: AdoptionRequestDetail, media_base_url: &Url) -> Self {
        let AdoptionRequestDetail { request, pet } = detail;
        Self {
            id: request.id,
            pet: PetResponse::new(pet, media_base_url),
            requester: request.requester_id,
            requester_name: request.requester_name,
            phone: request.phone,
            email: request.email,
            message: request.message,
            created_at: request.created_at,
        }
    }
}

fn service(state: &AppState) -> AdoptionRequestService<'_> {
    let repositories = state.repositories();
    AdoptionRequestService::new(
        repositories.pets.as_ref(),
        repositories.adoption_requests.as_ref(),
    )
}

/// Requests made for the caller's pets.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
) -> Result<Json<Vec<AdoptionRequestResponse>>> {
    let requests = service(&state).list(&caller).await?;
    let base = &state.config().media_base_url;
    Ok(Json(
        requests
            .into_iter()
            .map(|detail| AdoptionRequestResponse::new(detail, base))
            .collect(),
    ))
}

/// Show one request.
pub async fn retrieve(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiPath(id): ApiPath<AdoptionRequestId>,
) -> Result<Json<AdoptionRequestResponse>> {
    let detail = service(&state).retrieve(&caller, id).await?;
    Ok(Json(AdoptionRequestResponse::new(
        detail,
        &state.config().media_base_url,
    )))
}

/// Ask to adopt someone else's pet.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiJson(input): ApiJson<AdoptionRequestInput>,
) -> Result<(StatusCode, Json<AdoptionRequestResponse>)> {
    let detail = service(&state).create(&caller, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(AdoptionRequestResponse::new(
            detail,
            &state.config().media_base_url,
        )),
    ))
}

/// Replace a request's contact fields (`PUT`).
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiPath(id): ApiPath<AdoptionRequestId>,
    ApiJson(input): ApiJson<AdoptionRequestInput>,
) -> Result<Json<AdoptionRequestResponse>> {
    let detail = service(&state).update(&caller, id, input).await?;
    Ok(Json(AdoptionRequestResponse::new(
        detail,
        &state.config().media_base_url,
    )))
}

/// Change some contact fields of a request (`PATCH`).
pub async fn partial_update(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiPath(id): ApiPath<AdoptionRequestId>,
    ApiJson(input): ApiJson<AdoptionRequestInput>,
) -> Result<Json<AdoptionRequestResponse>> {
    let detail = service(&state).partial_update(&caller, id, input).await?;
    Ok(Json(AdoptionRequestResponse::new(
        detail,
        &state.config().media_base_url,
    )))
}

/// Discard a request.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiPath(id): ApiPath<AdoptionRequestId>,
) -> Result<StatusCode> {
    service(&state).delete(&caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

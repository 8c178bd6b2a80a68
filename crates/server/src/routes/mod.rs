//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                   - Liveness check
//! GET    /health/ready             - Readiness check (record store reachable)
//!
//! # Accounts
//! POST   /signup                   - Create account, returns {token, username}
//! POST   /login                    - Returns the account's token
//! GET    /me                       - The authenticated account
//!
//! # Pets (reads open, writes owner-only)
//! GET    /pets                     - List (?species=&city=&status=)
//! POST   /pets                     - Create, caller becomes owner
//! GET    /pets/{id}                - Detail
//! PUT    /pets/{id}                - Replace
//! PATCH  /pets/{id}                - Partial update
//! DELETE /pets/{id}                - Delete (cascades to requests)
//!
//! # Adoption requests (auth required, pet-owner-only)
//! GET    /adoption-requests        - Requests for the caller's pets
//! POST   /adoption-requests        - Ask to adopt {pet_id, requester_name, phone, email, message?}
//! GET    /adoption-requests/{id}   - Detail
//! PUT    /adoption-requests/{id}   - Replace contact fields
//! PATCH  /adoption-requests/{id}   - Partial update
//! DELETE /adoption-requests/{id}   - Discard
//! ```
//!
//! Trailing slashes are trimmed before routing (see [`crate::app`]).

pub mod adoption_requests;
pub mod auth;
pub mod health;
pub mod pets;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the account routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
}

/// Create the pet routes router.
pub fn pet_routes() -> Router<AppState> {
    Router::new()
        .route("/pets", get(pets::list).post(pets::create))
        .route(
            "/pets/{id}",
            get(pets::retrieve)
                .put(pets::update)
                .patch(pets::partial_update)
                .delete(pets::delete),
        )
}

/// Create the adoption request routes router.
pub fn adoption_request_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/adoption-requests",
            get(adoption_requests::list).post(adoption_requests::create),
        )
        .route(
            "/adoption-requests/{id}",
            get(adoption_requests::retrieve)
                .put(adoption_requests::update)
                .patch(adoption_requests::partial_update)
                .delete(adoption_requests::delete),
        )
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(auth_routes())
        .merge(pet_routes())
        .merge(adoption_request_routes())
}

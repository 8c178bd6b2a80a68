//! Integration tests for the pet adoption service.
//!
//! Tests drive the full HTTP stack (routing, trailing-slash trimming,
//! extractors, authentication) over the in-memory record store, so no
//! database or running server is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pet-adoption-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `signup_api` - Accounts and token authentication
//! - `pets_api` - Listings, filters and ownership rules
//! - `adoption_requests_api` - Requests and their visibility

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use pet_adoption_server::app::{self, App};
use pet_adoption_server::state::AppState;

/// A fresh application over an empty in-memory store.
pub struct TestContext {
    pub app: App,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            app: app::app(AppState::in_memory()),
        }
    }

    /// Send one request and return the status and decoded body.
    ///
    /// Empty bodies decode to `Value::Null`; non-JSON bodies to a string.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Token {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        self.send(request).await
    }

    /// Send a prepared request, for tests that need custom headers.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("infallible service");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    /// Create an account and return its token.
    pub async fn signup(&self, username: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/signup",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": "correct horse",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
        body["token"].as_str().expect("token in body").to_owned()
    }

    /// List a pet as the owner of `token` and return its JSON.
    pub async fn create_pet(&self, token: &str, name: &str, species: &str, city: &str) -> Value {
        let (status, body) = self
            .request(
                Method::POST,
                "/pets",
                Some(token),
                Some(pet_payload(name, species, city)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create pet failed: {body}");
        body
    }
}

/// A complete, valid pet payload.
#[must_use]
pub fn pet_payload(name: &str, species: &str, city: &str) -> Value {
    json!({
        "name": name,
        "age": 3,
        "species": species,
        "city": city,
        "photo": format!("pet_photos/{}.jpg", name.to_lowercase()),
        "description": format!("{name} is friendly."),
    })
}

/// A complete, valid adoption request payload.
#[must_use]
pub fn request_payload(pet_id: &Value) -> Value {
    json!({
        "pet_id": pet_id,
        "requester_name": "Bob Smith",
        "phone": "+15551234567",
        "email": "bob@example.com",
        "message": "We have a big garden.",
    })
}

//! Adoption request tests: creation rules and owner-only visibility.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

use pet_adoption_integration_tests::{TestContext, request_payload};
use pet_adoption_server::error::{NOT_AUTHENTICATED, NOT_FOUND};

/// Alice owns Rex; Bob has asked to adopt him.
struct Scenario {
    ctx: TestContext,
    alice: String,
    bob: String,
    pet: Value,
    request: Value,
}

async fn scenario() -> Scenario {
    let ctx = TestContext::new();
    let alice = ctx.signup("alice").await;
    let bob = ctx.signup("bob").await;
    let pet = ctx.create_pet(&alice, "Rex", "dog", "Paris").await;

    let (status, request) = ctx
        .request(
            Method::POST,
            "/adoption-requests",
            Some(&bob),
            Some(request_payload(&pet["id"])),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {request}");

    Scenario {
        ctx,
        alice,
        bob,
        pet,
        request,
    }
}

#[tokio::test]
async fn test_create_records_requester_and_nests_pet() {
    let s = scenario().await;
    let (_, bob) = s.ctx.request(Method::GET, "/me", Some(&s.bob), None).await;

    assert_eq!(s.request["requester"], bob["id"]);
    assert_eq!(s.request["requester_name"], "Bob Smith");
    assert_eq!(s.request["pet"]["id"], s.pet["id"]);
    assert_eq!(s.request["pet"]["name"], "Rex");
    assert!(s.request["created_at"].is_string());
}

#[tokio::test]
async fn test_create_requires_authentication() {
    let s = scenario().await;

    let (status, body) = s
        .ctx
        .request(
            Method::POST,
            "/adoption-requests",
            None,
            Some(request_payload(&s.pet["id"])),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], NOT_AUTHENTICATED);
}

#[tokio::test]
async fn test_duplicate_request_is_rejected() {
    let s = scenario().await;

    let (status, body) = s
        .ctx
        .request(
            Method::POST,
            "/adoption-requests",
            Some(&s.bob),
            Some(request_payload(&s.pet["id"])),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["non_field_errors"][0], "duplicate request");
}

#[tokio::test]
async fn test_owner_cannot_request_own_pet() {
    let s = scenario().await;

    let (status, body) = s
        .ctx
        .request(
            Method::POST,
            "/adoption-requests",
            Some(&s.alice),
            Some(request_payload(&s.pet["id"])),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["non_field_errors"][0], "cannot request your own pet");
}

#[tokio::test]
async fn test_pet_id_is_required() {
    let s = scenario().await;
    let mut payload = request_payload(&s.pet["id"]);
    payload.as_object_mut().unwrap().remove("pet_id");

    let (status, body) = s
        .ctx
        .request(Method::POST, "/adoption-requests", Some(&s.bob), Some(payload))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["pet_id"][0], "pet_id required");
}

#[tokio::test]
async fn test_unknown_pet_is_not_found() {
    let s = scenario().await;

    let (status, body) = s
        .ctx
        .request(
            Method::POST,
            "/adoption-requests",
            Some(&s.bob),
            Some(request_payload(&json!(9999))),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], NOT_FOUND);
}

#[tokio::test]
async fn test_only_pet_owner_sees_requests() {
    let s = scenario().await;

    let (status, body) = s
        .ctx
        .request(Method::GET, "/adoption-requests", Some(&s.alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = s
        .ctx
        .request(Method::GET, "/adoption-requests", Some(&s.bob), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let uri = format!("/adoption-requests/{}", s.request["id"]);
    let (status, _) = s.ctx.request(Method::GET, &uri, Some(&s.bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = s.ctx.request(Method::GET, &uri, Some(&s.alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], s.request["id"]);
}

#[tokio::test]
async fn test_owner_can_edit_contact_fields() {
    let s = scenario().await;
    let uri = format!("/adoption-requests/{}", s.request["id"]);

    let (status, body) = s
        .ctx
        .request(
            Method::PATCH,
            &uri,
            Some(&s.alice),
            Some(json!({"phone": "+15550000000"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phone"], "+15550000000");
    assert_eq!(body["message"], "We have a big garden.");

    let mut replacement = request_payload(&s.pet["id"]);
    replacement.as_object_mut().unwrap().remove("message");
    let (status, body) = s
        .ctx
        .request(Method::PUT, &uri, Some(&s.alice), Some(replacement))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_null());
    assert_eq!(body["pet"]["id"], s.pet["id"]);
}

#[tokio::test]
async fn test_requester_cannot_edit_or_delete() {
    let s = scenario().await;
    let uri = format!("/adoption-requests/{}", s.request["id"]);

    let (status, _) = s
        .ctx
        .request(
            Method::PATCH,
            &uri,
            Some(&s.bob),
            Some(json!({"phone": "+15550000000"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = s.ctx.request(Method::DELETE, &uri, Some(&s.bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_owner_can_delete() {
    let s = scenario().await;
    let uri = format!("/adoption-requests/{}", s.request["id"]);

    let (status, _) = s
        .ctx
        .request(Method::DELETE, &uri, Some(&s.alice), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = s
        .ctx
        .request(Method::GET, "/adoption-requests", Some(&s.alice), None)
        .await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_mistyped_body_is_checked_after_visibility() {
    let s = scenario().await;
    let uri = format!("/adoption-requests/{}", s.request["id"]);

    let (status, body) = s
        .ctx
        .request(Method::PATCH, &uri, Some(&s.bob), Some(json!({"phone": 5})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], NOT_FOUND);

    let (status, body) = s
        .ctx
        .request(
            Method::PATCH,
            &uri,
            Some(&s.alice),
            Some(json!({"phone": ["555"]})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["phone"][0], "Not a valid string.");
}

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use launchpad_auth::{SigningSecret, TokenIssuer, TokenVerifier};
use launchpad_catalog::{create_router, AppState, InMemoryStorage};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "catalog-test-secret";

fn app() -> Router {
    let secret = SigningSecret::new(SECRET).unwrap();
    let state = AppState::new(Arc::new(InMemoryStorage::new()), TokenVerifier::new(&secret));
    create_router(state)
}

fn bearer() -> String {
    let secret = SigningSecret::new(SECRET).unwrap();
    let token = TokenIssuer::new("deployment-service", &secret).issue().unwrap();
    format!("Bearer {}", token)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::empty()).unwrap()
}

const PROJECT: &str = "65f1a2b3c4d5e6f708192a3b";

#[tokio::test]
async fn health_is_open() {
    let app = app();
    let (status, body) = send(&app, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn created_service_is_visible_with_token() {
    let app = app();

    let (status, created) = send(
        &app,
        post_json(
            &format!("/projects/{}/services", PROJECT),
            json!({"name": "billing", "description": "invoices"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["project_id"], PROJECT);
    assert_eq!(created["name"], "billing");
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(id.len(), 24);

    let (status, fetched) = send(&app, get(&format!("/services/{}", id), Some(&bearer()))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], id.as_str());
    assert_eq!(fetched["description"], "invoices");
}

#[tokio::test]
async fn lookup_requires_token() {
    let app = app();
    let uri = format!("/services/{}", PROJECT);

    let (status, body) = send(&app, get(&uri, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "missing authorization header");

    let (status, body) = send(&app, get(&uri, Some("Bearer not-a-token"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid token");
}

#[tokio::test]
async fn lookup_of_unknown_service_is_not_found() {
    let app = app();

    let (status, body) = send(
        &app,
        get("/services/000000000000000000000000", Some(&bearer())),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "service not found");
}

#[tokio::test]
async fn lookup_with_malformed_id_is_bad_request() {
    let app = app();

    let (status, body) = send(&app, get("/services/not-an-id", Some(&bearer()))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid service ID format");
}

#[tokio::test]
async fn create_rejects_bad_input() {
    let app = app();

    let (status, body) = send(
        &app,
        post_json("/projects/xyz/services", json!({"name": "billing"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid project ID format");

    let (status, body) = send(
        &app,
        post_json(&format!("/projects/{}/services", PROJECT), json!({"name": "  "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid request payload");

    let (status, _) = send(
        &app,
        post_json(&format!("/projects/{}/services", PROJECT), json!({"title": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_is_paginated() {
    let app = app();
    for name in ["a", "b", "c"] {
        let (status, _) = send(
            &app,
            post_json(&format!("/projects/{}/services", PROJECT), json!({"name": name})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(
        &app,
        get(&format!("/projects/{}/services?page=2&limit=2", PROJECT), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 2);
    assert_eq!(body["limit"], 2);
    assert_eq!(body["total_count"], 3);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "a");

    let (_, body) = send(
        &app,
        get(&format!("/projects/{}/services?page=abc&limit=0", PROJECT), None),
    )
    .await;
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 10);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

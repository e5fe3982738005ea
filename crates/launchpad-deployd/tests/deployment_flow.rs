//! Deployment lifecycle against a live catalog and a mocked activation endpoint

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use launchpad_auth::{SigningSecret, TokenIssuer, TokenVerifier};
use launchpad_deployd::{
    create_router, Activation, AppState, CatalogClient, DeploymentOrchestrator, Dispatcher,
    HttpEffector, InMemoryStorage,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const SECRET: &str = "shared-deployment-secret";

/// Serve a real catalog on an ephemeral port and return its base URL
async fn start_catalog(secret: &str) -> String {
    let secret = SigningSecret::new(secret).unwrap();
    let state = launchpad_catalog::AppState::new(
        Arc::new(launchpad_catalog::InMemoryStorage::new()),
        TokenVerifier::new(&secret),
    );
    let app = launchpad_catalog::create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Register a service in the catalog and return its id
async fn register_service(catalog_url: &str) -> String {
    let project = "65f1a2b3c4d5e6f708192a3b";
    let response = reqwest::Client::new()
        .post(format!("{}/projects/{}/services", catalog_url, project))
        .json(&json!({"name": "billing"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

fn deployd(catalog_url: &str, effector_url: &str) -> Router {
    let secret = SigningSecret::new(SECRET).unwrap();
    let issuer = TokenIssuer::new(launchpad_deployd::SERVICE_NAME, &secret);
    let validator = CatalogClient::new(catalog_url, issuer, Duration::from_secs(10)).unwrap();
    let effector = HttpEffector::new(effector_url, Duration::from_secs(15)).unwrap();

    let storage = Arc::new(InMemoryStorage::new());
    let activation = Arc::new(Activation::new(storage.clone(), Arc::new(effector)));
    let orchestrator = DeploymentOrchestrator::new(
        Arc::new(validator),
        storage,
        Dispatcher::detached(activation),
    );
    create_router(AppState::new(Arc::new(orchestrator)))
}

async fn effector_answering(code: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(code).set_body_json(json!({"id": 101})))
        .mount(&server)
        .await;
    server
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Poll the listing until the deployment leaves `Pending`
async fn settled_status(app: &Router, service_id: &str, deployment_id: &str) -> String {
    let uri = format!("/services/{}/deployments", service_id);
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let (status, body) = send(app, "GET", &uri).await;
            assert_eq!(status, StatusCode::OK);
            let record = body["data"]
                .as_array()
                .unwrap()
                .iter()
                .find(|d| d["id"] == deployment_id)
                .cloned()
                .unwrap();
            if record["status"] != "Pending" {
                return record["status"].as_str().unwrap().to_string();
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn unknown_service_is_not_found_and_nothing_is_recorded() {
    let catalog = start_catalog(SECRET).await;
    let effector = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&effector)
        .await;
    let app = deployd(&catalog, &effector.uri());

    let service_id = "0123456789abcdef01234567";
    let (status, body) = send(&app, "POST", &format!("/services/{}/deployments", service_id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "service not found");

    let (status, body) = send(&app, "GET", &format!("/services/{}/deployments", service_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 0);
    assert_eq!(body["total_pages"], 0);
}

#[tokio::test]
async fn failing_activation_ends_failed() {
    let catalog = start_catalog(SECRET).await;
    let effector = effector_answering(500).await;
    let app = deployd(&catalog, &effector.uri());
    let service_id = register_service(&catalog).await;

    let (status, body) = send(&app, "POST", &format!("/services/{}/deployments", service_id)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "Pending");
    assert_eq!(body["service_id"], service_id.as_str());
    let deployment_id = body["id"].as_str().unwrap().to_string();

    assert_eq!(settled_status(&app, &service_id, &deployment_id).await, "Failed");
}

#[tokio::test]
async fn successful_activation_ends_running() {
    let catalog = start_catalog(SECRET).await;
    let effector = effector_answering(201).await;
    let app = deployd(&catalog, &effector.uri());
    let service_id = register_service(&catalog).await;

    let (status, body) = send(&app, "POST", &format!("/services/{}/deployments", service_id)).await;
    assert_eq!(status, StatusCode::CREATED);
    let deployment_id = body["id"].as_str().unwrap().to_string();

    assert_eq!(settled_status(&app, &service_id, &deployment_id).await, "Running");

    let requests = effector.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let payload: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(payload["deployment_id"], deployment_id.as_str());
    assert_eq!(payload["service_id"], service_id.as_str());
}

#[tokio::test]
async fn malformed_id_makes_no_network_calls() {
    let catalog = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&catalog)
        .await;
    let effector = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&effector)
        .await;
    let app = deployd(&catalog.uri(), &effector.uri());

    let (status, body) = send(&app, "POST", "/services/not-an-id/deployments").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid service ID format");
}

#[tokio::test]
async fn mismatched_secrets_surface_as_upstream_auth_failure() {
    let catalog = start_catalog("a-different-secret").await;
    let effector = effector_answering(201).await;
    let app = deployd(&catalog, &effector.uri());
    let service_id = register_service(&catalog).await;

    let (status, body) = send(&app, "POST", &format!("/services/{}/deployments", service_id)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "failed to validate service");
    assert_eq!(body["code"], "UPSTREAM_AUTH_FAILURE");
    assert!(body["msg"].as_str().unwrap().contains("invalid token"));
}

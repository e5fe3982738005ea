//! API Router configuration

use super::handlers;
use super::state::AppState;
use axum::{middleware, routing::get, Router};
use launchpad_auth::require_service_token;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the catalog router
pub fn create_router(state: AppState) -> Router {
    // Called by other services; every request must carry a service token
    let service_routes = Router::new()
        .route("/services/:id", get(handlers::get_service))
        .route_layer(middleware::from_fn_with_state(
            state.verifier.clone(),
            require_service_token,
        ));

    let project_routes = Router::new().route(
        "/projects/:project_id/services",
        get(handlers::list_services).post(handlers::create_service),
    );

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(project_routes)
        .merge(service_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wrap a router with a permissive CORS layer
pub fn with_cors(router: Router) -> Router {
    router.layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

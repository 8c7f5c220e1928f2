//! Route definitions for the Tollgate HTTP API.
//!
//! Routes are organized by domain and mounted under `/api`, except the
//! JWKS well-known path and the internal usage endpoint. The router
//! receives `AppState` and passes it to all handlers via axum's `State`
//! extractor.

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, patch, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(authorize_routes())
        .merge(tenant_routes())
        .merge(key_routes())
        .merge(health_routes());

    let cors = build_cors_layer(&state);

    Router::new()
        .nest("/api", api_routes)
        .route("/.well-known/jwks.json", get(handlers::jwks::jwks))
        .route("/internal/usage", post(handlers::usage::record))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Session endpoints: login, refresh, logout.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
}

/// The decision endpoint.
fn authorize_routes() -> Router<AppState> {
    Router::new().route("/authorize", post(handlers::authorize::authorize))
}

/// Signup and membership management.
fn tenant_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(handlers::tenant::signup))
        .route(
            "/tenants/{tenant_id}/members",
            get(handlers::tenant::list_members).post(handlers::tenant::add_member),
        )
        .route(
            "/tenants/{tenant_id}/members/{user_id}",
            patch(handlers::tenant::update_member).delete(handlers::tenant::remove_member),
        )
}

/// API key lifecycle.
fn key_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tenants/{tenant_id}/keys",
            get(handlers::keys::list).post(handlers::keys::create),
        )
        .route(
            "/tenants/{tenant_id}/keys/{id}",
            get(handlers::keys::get)
                .patch(handlers::keys::update)
                .delete(handlers::keys::revoke),
        )
}

/// Liveness.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// CORS from configuration; same-origin only when no origins are listed.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let origins = &state.config.server.cors_allowed_origins;

    if origins.is_empty() {
        CorsLayer::new()
    } else if origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        let parsed: Vec<axum::http::HeaderValue> =
            origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(parsed)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

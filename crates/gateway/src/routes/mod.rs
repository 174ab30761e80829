//! Gateway routes

pub mod health;
pub mod storefront;
pub mod tenants;

use axum::{http::StatusCode, middleware, routing::get, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::routing::tenant_routing;
use crate::state::AppState;

/// Create the gateway router with the tenant routing middleware applied to
/// every route.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Platform landing page (public)
        .route("/", get(landing))
        // Health check routes (at root level for infrastructure monitoring)
        .route("/healthz", get(health::liveness))
        .route("/readyz", get(health::readiness))
        // Auth surface; the authentication layer owns these, the gateway
        // only guarantees they stay reachable without a resolved tenant
        .route("/sign-in", get(auth_handoff))
        .route("/sign-up", get(auth_handoff))
        // Public tenant directory passthrough
        .route(
            "/api/tenants/by-subdomain/:subdomain",
            get(tenants::by_subdomain),
        )
        // Merchant-scoped routes; storefront requests land here through the
        // internal rewrite, admin requests arrive with this path verbatim
        .route("/store/:tenant", get(storefront::context))
        .route("/store/:tenant/*path", get(storefront::context_nested))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            tenant_routing,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn landing() -> Json<serde_json::Value> {
    Json(json!({
        "service": "storegate",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn auth_handoff() -> StatusCode {
    StatusCode::OK
}

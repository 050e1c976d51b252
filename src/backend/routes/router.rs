/**
 * Router Configuration
 *
 * Combines the API routes, static file serving and the shared layers into
 * the application router.
 *
 * # Route Order
 *
 * 1. API routes (`/api/...`)
 * 2. Static files under `/static` (served from `public/`)
 * 3. Fallback: JSON 404
 *
 * # Layers
 *
 * - `TraceLayer` - one span per request
 * - `CorsLayer` - allows the configured frontend origin
 */

use axum::{http::HeaderValue, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::backend::error::BackendError;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Directory served under `/static`
pub const STATIC_DIR: &str = "public";

fn cors_layer(app_base_url: &str) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match HeaderValue::from_str(app_base_url) {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            tracing::warn!("APP_BASE_URL is not a valid origin ({}), allowing any origin", e);
            cors.allow_origin(Any)
        }
    }
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = configure_api_routes(Router::new(), &app_state);

    let router = router.nest_service("/static", ServeDir::new(STATIC_DIR));

    let router = router.fallback(|| async { BackendError::not_found("Route") });

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&app_state.config.app_base_url)),
        )
        .with_state(app_state)
}

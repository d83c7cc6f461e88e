//! Axum server setup and routing.

use std::sync::Arc;

use axum::{Router, routing::get};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::api;
use crate::state::AppState;

/// Create the Axum router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/jobs", get(api::jobs::list_jobs))
        .route("/backends", get(api::backends::list_backends))
        .route("/metrics", get(api::metrics::get_metrics));

    // TODO: Make CORS configurable; restrict origins in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(api::health::health))
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

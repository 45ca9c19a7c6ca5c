use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health::health_check))

        // Driving experiences
        .route("/experiences", get(handlers::experience::list_experiences))
        .route("/experiences", post(handlers::experience::create_experience))
        .route(
            "/experiences/:token",
            get(handlers::experience::get_experience)
                .put(handlers::experience::update_experience)
                .delete(handlers::experience::delete_experience),
        )

        // Lookup tables (append-only)
        .route("/lookups", get(handlers::lookup::list_lookups))
        .route("/lookups/:kind", post(handlers::lookup::add_lookup))

        // Statistics
        .route("/stats", get(handlers::stats::get_statistics))

        // Add state
        .with_state(state)

        // Layers
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

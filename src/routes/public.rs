use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Unauthenticated, read-only endpoints. No permission check applies to restaurant reads.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers and monitoring.
        .route("/health", get(|| async { "ok" }))
        // GET /api/restaurant?search_phrase=...&sort_by=...&sort_direction=...&page_size=...&page_number=...
        // Paged listing with case-insensitive search over name and description.
        .route("/api/restaurant", get(handlers::get_restaurants))
        // GET /api/restaurant/{id}
        // Single restaurant with address and dishes.
        .route("/api/restaurant/{id}", get(handlers::get_restaurant))
}

use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{post, put},
};

/// Authenticated Router Module
///
/// Every handler here receives a validated `Principal`. Role checks (creation) happen in
/// the handler; ownership checks (modify/delete) happen in the restaurant service.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /api/restaurant
        // Creates a restaurant owned by the caller. Admin/Manager only.
        .route("/api/restaurant", post(handlers::create_restaurant))
        // PUT/DELETE /api/restaurant/{id}
        // Creator or Admin only; enforced by the permission evaluator.
        .route(
            "/api/restaurant/{id}",
            put(handlers::modify_restaurant).delete(handlers::delete_restaurant),
        )
}

use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod authorization;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod request_time;
pub mod models;
pub mod query;
pub mod repository;
pub mod service;

// Routing segregated by access level (Public, Authenticated).
pub mod routes;
use auth::Principal;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use errors::ServiceError;
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use service::RestaurantService;

/// ApiDoc
///
/// OpenAPI description of every restaurant endpoint, served at `/api-docs/openapi.json`
/// and rendered by the Swagger UI.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_restaurants, handlers::get_restaurant, handlers::create_restaurant,
        handlers::modify_restaurant, handlers::delete_restaurant,
    ),
    components(
        schemas(
            models::RestaurantDto, models::DishDto, models::CreateRestaurantRequest,
            models::ModifyRestaurantRequest, query::SortDirection, query::SortBy,
        )
    ),
    tags(
        (name = "restaurant-api", description = "Restaurant management API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared container handed to every handler: the restaurant service built
/// on the chosen store, and the immutable configuration.
#[derive(Clone)]
pub struct AppState {
    pub restaurants: RestaurantService,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        Self {
            restaurants: RestaurantService::new(repo),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Guards `authenticated_routes`: extracting `Principal` rejects the request with
/// 401 before the handler runs when no valid identity is present.
async fn auth_middleware(_principal: Principal, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routes, applies global and scoped middleware, and registers the state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            request_time::request_time_middleware,
        ))
        .with_state(state);

    // Observability and correlation layers wrap everything else.
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span so every log line of one request carries the same
/// `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}

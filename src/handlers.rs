use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::{HeaderName, StatusCode, header},
};
use chrono::Local;

use crate::{
    AppState,
    auth::{ADMIN_ROLE, MANAGER_ROLE, Principal},
    authorization::MinimumAgeRequirement,
    errors::ServiceError,
    models::{CreateRestaurantRequest, ModifyRestaurantRequest, PageResult, RestaurantDto},
    query::RestaurantQuery,
};

/// get_restaurants
///
/// [Public Route] Lists restaurants with search, sort and pagination.
#[utoipa::path(
    get,
    path = "/api/restaurant",
    params(RestaurantQuery),
    responses(
        (status = 200, description = "One page of restaurants", body = PageResult<RestaurantDto>),
        (status = 400, description = "Invalid sort column or paging values")
    )
)]
pub async fn get_restaurants(
    State(state): State<AppState>,
    query: Result<Query<RestaurantQuery>, QueryRejection>,
) -> Result<Json<PageResult<RestaurantDto>>, ServiceError> {
    let Query(query) = query?;
    let page = state.restaurants.get_all(query).await?;
    Ok(Json(page))
}

/// get_restaurant
///
/// [Public Route] A single restaurant with its address and dishes.
#[utoipa::path(
    get,
    path = "/api/restaurant/{id}",
    params(("id" = i64, Path, description = "Restaurant ID")),
    responses(
        (status = 200, description = "Found", body = RestaurantDto),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RestaurantDto>, ServiceError> {
    let restaurant = state.restaurants.get_by_id(id).await?;
    Ok(Json(restaurant))
}

/// create_restaurant
///
/// [Authenticated Route] Restricted to the `Admin` and `Manager` roles. When a minimum
/// age is configured the caller's `date_of_birth` claim must also satisfy it.
#[utoipa::path(
    post,
    path = "/api/restaurant",
    request_body = CreateRestaurantRequest,
    responses(
        (status = 201, description = "Created; Location header points at the new restaurant"),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Missing role or age requirement not met")
    )
)]
pub async fn create_restaurant(
    principal: Principal,
    State(state): State<AppState>,
    Json(payload): Json<CreateRestaurantRequest>,
) -> Result<(StatusCode, [(HeaderName, String); 1]), ServiceError> {
    if !principal.has_any_role(&[ADMIN_ROLE, MANAGER_ROLE]) {
        return Err(ServiceError::Forbidden);
    }

    if let Some(minimum_age) = state.config.minimum_age {
        let check =
            MinimumAgeRequirement::new(minimum_age).evaluate(&principal, Local::now().date_naive());
        if !check.succeeded() {
            return Err(ServiceError::Forbidden);
        }
    }

    let id = state.restaurants.create(payload, &principal).await?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/api/restaurant/{}", id))],
    ))
}

/// modify_restaurant
///
/// [Authenticated Route] Partial update; allowed for the creator or an `Admin`.
#[utoipa::path(
    put,
    path = "/api/restaurant/{id}",
    params(("id" = i64, Path, description = "Restaurant ID")),
    request_body = ModifyRestaurantRequest,
    responses(
        (status = 200, description = "Updated"),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn modify_restaurant(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ModifyRestaurantRequest>,
) -> Result<StatusCode, ServiceError> {
    state.restaurants.modify(id, payload, &principal).await?;
    Ok(StatusCode::OK)
}

/// delete_restaurant
///
/// [Authenticated Route] Removes a restaurant together with its address; allowed for the
/// creator or an `Admin`.
#[utoipa::path(
    delete,
    path = "/api/restaurant/{id}",
    params(("id" = i64, Path, description = "Restaurant ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_restaurant(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    state.restaurants.delete(id, &principal).await?;
    Ok(StatusCode::NO_CONTENT)
}

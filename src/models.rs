use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{errors::ServiceError, query::page_offset};

const MAX_NAME_LENGTH: usize = 25;
const MAX_ADDRESS_FIELD_LENGTH: usize = 50;

// --- Core Application Schemas (Mapped to Database) ---

/// Restaurant
///
/// A row of the `restaurants` table without its related address and dishes.
/// `id` is assigned by the store; `created_by_id` is written once at creation and
/// never updated afterwards. Seeded rows may have no creator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Default)]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub has_delivery: bool,
    pub contact_email: Option<String>,
    pub contact_number: Option<String>,
    pub created_by_id: Option<i64>,
}

/// Address
///
/// The `addresses` row owned by exactly one restaurant (deleted with it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Default)]
pub struct Address {
    pub city: String,
    pub street: String,
    pub postal_code: Option<String>,
}

/// Dish
///
/// A `dishes` row; always belongs to a single restaurant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, Default)]
pub struct Dish {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
}

/// NewRestaurant
///
/// Everything the store needs to insert a restaurant together with its address.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRestaurant {
    pub name: String,
    pub description: String,
    pub category: String,
    pub has_delivery: bool,
    pub contact_email: Option<String>,
    pub contact_number: Option<String>,
    pub address: Address,
    pub created_by_id: i64,
}

// --- Request Payloads (Input Schemas) ---

/// CreateRestaurantRequest
///
/// Input payload for `POST /api/restaurant`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateRestaurantRequest {
    #[schema(example = "Pizzeria Roma")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub has_delivery: bool,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    pub city: String,
    pub street: String,
    #[serde(default)]
    pub postal_code: Option<String>,
}

impl CreateRestaurantRequest {
    pub fn validate(&self) -> Result<(), ServiceError> {
        validate_name(&self.name)?;
        validate_address_field("city", &self.city)?;
        validate_address_field("street", &self.street)
    }

    /// Maps the payload onto a new record owned by `created_by_id`.
    pub fn into_new_restaurant(self, created_by_id: i64) -> NewRestaurant {
        NewRestaurant {
            name: self.name,
            description: self.description.unwrap_or_default(),
            category: self.category,
            has_delivery: self.has_delivery,
            contact_email: self.contact_email,
            contact_number: self.contact_number,
            address: Address {
                city: self.city,
                street: self.street,
                postal_code: self.postal_code,
            },
            created_by_id,
        }
    }
}

/// ModifyRestaurantRequest
///
/// Partial update payload for `PUT /api/restaurant/{id}`. Absent fields leave the
/// stored value untouched.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ModifyRestaurantRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_delivery: Option<bool>,
}

impl ModifyRestaurantRequest {
    pub fn validate(&self) -> Result<(), ServiceError> {
        match &self.name {
            Some(name) => validate_name(name),
            None => Ok(()),
        }
    }

    /// Overwrites only the fields present in the request.
    pub fn apply_to(self, restaurant: &mut Restaurant) {
        if let Some(name) = self.name {
            restaurant.name = name;
        }
        if let Some(description) = self.description {
            restaurant.description = description;
        }
        if let Some(has_delivery) = self.has_delivery {
            restaurant.has_delivery = has_delivery;
        }
    }
}

fn validate_name(name: &str) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::invalid("name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ServiceError::invalid(format!(
            "name must be at most {} characters",
            MAX_NAME_LENGTH
        )));
    }
    Ok(())
}

fn validate_address_field(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::invalid(format!("{} must not be empty", field)));
    }
    if value.chars().count() > MAX_ADDRESS_FIELD_LENGTH {
        return Err(ServiceError::invalid(format!(
            "{} must be at most {} characters",
            field, MAX_ADDRESS_FIELD_LENGTH
        )));
    }
    Ok(())
}

// --- Response Schemas (Output) ---

/// DishDto
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DishDto {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
}

impl From<Dish> for DishDto {
    fn from(dish: Dish) -> Self {
        Self {
            id: dish.id,
            name: dish.name,
            description: dish.description,
            price: dish.price,
        }
    }
}

/// RestaurantDto
///
/// A restaurant flattened together with its address and dishes, as returned by
/// the read endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RestaurantDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub has_delivery: bool,
    pub city: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub dishes: Vec<DishDto>,
}

impl RestaurantDto {
    pub fn assemble(restaurant: Restaurant, address: Option<Address>, dishes: Vec<Dish>) -> Self {
        let (city, street, postal_code) = match address {
            Some(a) => (Some(a.city), Some(a.street), a.postal_code),
            None => (None, None, None),
        };
        Self {
            id: restaurant.id,
            name: restaurant.name,
            description: restaurant.description,
            category: restaurant.category,
            has_delivery: restaurant.has_delivery,
            city,
            street,
            postal_code,
            dishes: dishes.into_iter().map(DishDto::from).collect(),
        }
    }
}

/// PageResult
///
/// One page of a listing. `total_count` counts every match of the filter, not just the
/// items on this page; `items_from`/`items_to` are the 1-based positions the page covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page_size: i64,
    pub page_number: i64,
    pub total_pages: i64,
    pub items_from: i64,
    pub items_to: i64,
}

impl<T> PageResult<T> {
    /// Expects `page_size >= 1`. Positions saturate at `i64::MAX` for pages far past the end.
    pub fn new(items: Vec<T>, total_count: i64, page_size: i64, page_number: i64) -> Self {
        let page_size_or_one = page_size.max(1);
        let total_pages = if total_count <= 0 {
            0
        } else {
            (total_count - 1) / page_size_or_one + 1
        };
        let items_from = page_offset(page_size_or_one, page_number).saturating_add(1);
        Self {
            items,
            total_count,
            page_size,
            page_number,
            total_pages,
            items_from,
            items_to: items_from.saturating_add(page_size_or_one - 1),
        }
    }
}

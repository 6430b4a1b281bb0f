#![allow(dead_code)]

use jsonwebtoken::{EncodingKey, Header, encode};
use restaurant_api::{
    AppConfig, AppState, InMemoryRepository,
    auth::{ADMIN_ROLE, Claims, MANAGER_ROLE, Principal},
    models::CreateRestaurantRequest,
    repository::Repository,
};
use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

pub const OWNER_ID: i64 = 42;
pub const OTHER_ID: i64 = 7;
pub const ADMIN_ID: i64 = 1;

pub fn principal(id: i64, roles: &[&str]) -> Principal {
    Principal {
        id,
        name: Some(format!("user{}@example.com", id)),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        date_of_birth: None,
    }
}

pub fn owner() -> Principal {
    principal(OWNER_ID, &[MANAGER_ROLE])
}

pub fn stranger() -> Principal {
    principal(OTHER_ID, &[])
}

pub fn admin() -> Principal {
    principal(ADMIN_ID, &[ADMIN_ROLE])
}

pub fn create_request(name: &str, description: &str, category: &str) -> CreateRestaurantRequest {
    CreateRestaurantRequest {
        name: name.to_string(),
        description: Some(description.to_string()),
        category: category.to_string(),
        has_delivery: true,
        contact_email: Some("contact@example.com".to_string()),
        contact_number: Some("555-0100".to_string()),
        city: "Krakow".to_string(),
        street: "Dluga 5".to_string(),
        postal_code: Some("30-001".to_string()),
    }
}

/// Inserts restaurants owned by `created_by` straight into the store; returns their ids in order.
pub async fn seed(repo: &InMemoryRepository, created_by: i64, rows: &[(&str, &str, &str)]) -> Vec<i64> {
    let mut ids = Vec::with_capacity(rows.len());
    for (name, description, category) in rows {
        let id = repo
            .create_restaurant(create_request(name, description, category).into_new_restaurant(created_by))
            .await
            .unwrap();
        ids.push(id);
    }
    ids
}

pub fn state_with(repo: Arc<InMemoryRepository>, config: AppConfig) -> AppState {
    AppState::new(repo, config)
}

pub fn now_secs() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64
}

/// Signs an HS256 token whose `exp` lies `expires_in` seconds from now (negative = expired).
pub fn make_token(
    secret: &str,
    sub: &str,
    roles: &[&str],
    date_of_birth: Option<&str>,
    expires_in: i64,
) -> String {
    let now = now_secs();
    let claims = Claims {
        sub: sub.to_string(),
        name: Some("tester@example.com".to_string()),
        roles: roles.iter().map(|r| r.to_string()).collect(),
        date_of_birth: date_of_birth.map(str::to_string),
        exp: (now + expires_in) as usize,
        iat: now as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

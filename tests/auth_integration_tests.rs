mod common;

use axum::{
    extract::FromRequestParts,
    http::{Request, StatusCode, header, request::Parts},
};
use restaurant_api::{
    AppConfig, AppState, InMemoryRepository,
    auth::{ADMIN_ROLE, MANAGER_ROLE, Principal},
    config::Env,
};
use std::sync::Arc;

use common::make_token;

const SECRET: &str = "auth-test-secret";

fn test_state(env: Env) -> AppState {
    let config = AppConfig {
        env,
        jwt_secret: SECRET.to_string(),
        ..AppConfig::default()
    };
    AppState::new(Arc::new(InMemoryRepository::new()), config)
}

fn parts_with_headers(headers: &[(&str, &str)]) -> Parts {
    let mut builder = Request::builder().uri("/api/restaurant");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(()).unwrap().into_parts().0
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

async fn extract(state: &AppState, headers: &[(&str, &str)]) -> Result<Principal, StatusCode> {
    let mut parts = parts_with_headers(headers);
    Principal::from_request_parts(&mut parts, state).await
}

#[tokio::test]
async fn test_valid_token_resolves_principal_claims() {
    let state = test_state(Env::Production);
    let token = make_token(SECRET, "42", &[MANAGER_ROLE], Some("1990-05-17"), 3600);
    let auth = bearer(&token);

    let principal = extract(&state, &[(header::AUTHORIZATION.as_str(), auth.as_str())])
        .await
        .expect("valid token must authenticate");

    assert_eq!(principal.id, 42);
    assert_eq!(principal.roles, vec![MANAGER_ROLE.to_string()]);
    assert_eq!(principal.date_of_birth.as_deref(), Some("1990-05-17"));
    assert!(!principal.is_admin());
}

#[tokio::test]
async fn test_missing_authorization_header_is_unauthorized() {
    let state = test_state(Env::Production);
    assert_eq!(extract(&state, &[]).await, Err(StatusCode::UNAUTHORIZED));
}

#[tokio::test]
async fn test_non_bearer_scheme_is_unauthorized() {
    let state = test_state(Env::Production);
    let token = make_token(SECRET, "42", &[], None, 3600);
    let basic = format!("Basic {}", token);

    let result = extract(&state, &[(header::AUTHORIZATION.as_str(), basic.as_str())]).await;
    assert_eq!(result, Err(StatusCode::UNAUTHORIZED));
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let state = test_state(Env::Production);
    let token = make_token(SECRET, "42", &[ADMIN_ROLE], None, -3600);
    let auth = bearer(&token);

    let result = extract(&state, &[(header::AUTHORIZATION.as_str(), auth.as_str())]).await;
    assert_eq!(result, Err(StatusCode::UNAUTHORIZED));
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_unauthorized() {
    let state = test_state(Env::Production);
    let token = make_token("someone-elses-secret", "42", &[ADMIN_ROLE], None, 3600);
    let auth = bearer(&token);

    let result = extract(&state, &[(header::AUTHORIZATION.as_str(), auth.as_str())]).await;
    assert_eq!(result, Err(StatusCode::UNAUTHORIZED));
}

#[tokio::test]
async fn test_non_numeric_subject_is_unauthorized() {
    let state = test_state(Env::Production);
    let token = make_token(SECRET, "not-a-number", &[], None, 3600);
    let auth = bearer(&token);

    let result = extract(&state, &[(header::AUTHORIZATION.as_str(), auth.as_str())]).await;
    assert_eq!(result, Err(StatusCode::UNAUTHORIZED));
}

#[tokio::test]
async fn test_local_bypass_headers_resolve_principal() {
    let state = test_state(Env::Local);

    let principal = extract(
        &state,
        &[
            ("x-user-id", "42"),
            ("x-user-roles", "Manager, Admin"),
            ("x-user-dob", "2000-01-01"),
        ],
    )
    .await
    .expect("local bypass should authenticate");

    assert_eq!(principal.id, 42);
    assert!(principal.is_admin());
    assert!(principal.has_role(MANAGER_ROLE));
    assert_eq!(principal.date_of_birth.as_deref(), Some("2000-01-01"));
}

#[tokio::test]
async fn test_local_bypass_with_bad_id_falls_back_to_token() {
    let state = test_state(Env::Local);
    let token = make_token(SECRET, "9", &[], None, 3600);
    let auth = bearer(&token);

    let principal = extract(
        &state,
        &[("x-user-id", "abc"), (header::AUTHORIZATION.as_str(), auth.as_str())],
    )
    .await
    .unwrap();

    assert_eq!(principal.id, 9);
}

#[tokio::test]
async fn test_bypass_headers_ignored_in_production() {
    let state = test_state(Env::Production);

    let result = extract(&state, &[("x-user-id", "42"), ("x-user-roles", "Admin")]).await;
    assert_eq!(result, Err(StatusCode::UNAUTHORIZED));
}

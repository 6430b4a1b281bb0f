use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::config::{AppConfig, Env};

/// Role claim granting unrestricted modify/delete rights.
pub const ADMIN_ROLE: &str = "Admin";
/// Role claim allowed, together with `Admin`, to create restaurants.
pub const MANAGER_ROLE: &str = "Manager";

/// Claims
///
/// The payload expected inside a JSON Web Token. `sub` carries the numeric user id as a
/// string, as the JWT registered claim requires.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    /// Calendar date (`YYYY-MM-DD` or RFC 3339); checked by the age policy.
    #[serde(default)]
    pub date_of_birth: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

/// Principal
///
/// The authenticated caller as a set of claims. Handlers pass it explicitly to the
/// service layer, which uses it for ownership and role decisions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Principal {
    pub id: i64,
    pub name: Option<String>,
    pub roles: Vec<String>,
    pub date_of_birth: Option<String>,
}

impl Principal {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}

impl TryFrom<Claims> for Principal {
    type Error = StatusCode;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims.sub.parse().map_err(|_| StatusCode::UNAUTHORIZED)?;
        Ok(Principal {
            id,
            name: claims.name,
            roles: claims.roles,
            date_of_birth: claims.date_of_birth,
        })
    }
}

/// Principal Extractor
///
/// Resolves the caller from the request:
/// 1. Local bypass: in `Env::Local`, an `x-user-id` header (plus optional `x-user-roles`
///    and `x-user-dob`) is accepted without a token.
/// 2. Bearer token extraction and HS256 JWT validation with `exp` enforced.
///
/// Rejection: `StatusCode::UNAUTHORIZED` on any failure.
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            if let Some(principal) = principal_from_dev_headers(parts) {
                return Ok(principal);
            }
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            StatusCode::UNAUTHORIZED
        })?;

        Principal::try_from(token_data.claims)
    }
}

fn principal_from_dev_headers(parts: &Parts) -> Option<Principal> {
    let header_str = |name: &str| parts.headers.get(name).and_then(|v| v.to_str().ok());

    let id = header_str("x-user-id")?.trim().parse().ok()?;
    let roles = header_str("x-user-roles")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|role| !role.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Some(Principal {
        id,
        name: None,
        roles,
        date_of_birth: header_str("x-user-dob").map(str::to_string),
    })
}

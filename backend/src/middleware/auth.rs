use crate::config::Config;
use crate::error::{InventoryError, InventoryResult};
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const PUBLIC_ROUTES: &[&str] = &["/api/login"];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

pub fn issue_token(config: &Config, email: &str, role: &str) -> InventoryResult<String> {
    let now = chrono::Utc::now();
    let exp = now
        .checked_add_signed(config.token_ttl()?)
        .ok_or_else(|| InventoryError::Config("Token expiry out of range".to_string()))?;
    let claims = Claims {
        sub: email.to_string(),
        role: role.to_string(),
        iat: now.timestamp() as usize,
        exp: exp.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?)
}

pub fn verify_token(config: &Config, token: &str) -> InventoryResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

fn unauthorized() -> InventoryError {
    InventoryError::Auth("Unauthorized access".to_string())
}

/// Requires a valid admin bearer token on every `/api` route except login.
/// The decoded claims are attached to the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, InventoryError> {
    let path = request.uri().path();
    if !path.starts_with("/api/") || PUBLIC_ROUTES.contains(&path) {
        return Ok(next.run(request).await);
    }

    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(unauthorized)?
        .to_str()
        .map_err(|_| unauthorized())?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(unauthorized)?;

    let claims = verify_token(&state.config, token).map_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
        unauthorized()
    })?;

    if !claims.is_admin() {
        return Err(unauthorized());
    }

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config(secret: &str, ttl_hours: u32) -> Config {
        Config {
            port: 0,
            database_url: String::new(),
            admin_email: "admin@example.com".to_string(),
            admin_password: "secret".to_string(),
            jwt_secret: secret.to_string(),
            token_ttl_hours: ttl_hours,
            static_dir: PathBuf::from("public"),
        }
    }

    #[test]
    fn test_issued_token_verifies() {
        let cfg = config("unit-test-secret", 1);
        let token = issue_token(&cfg, "admin@example.com", "admin").unwrap();
        let claims = verify_token(&cfg, &token).unwrap();
        assert_eq!(claims.sub, "admin@example.com");
        assert!(claims.is_admin());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let token = issue_token(&config("one", 1), "admin@example.com", "admin").unwrap();
        assert!(verify_token(&config("two", 1), &token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let cfg = config("unit-test-secret", 1);
        // Default validation allows 60s of leeway, so go well past it.
        let issued = chrono::Utc::now() - chrono::TimeDelta::hours(3);
        let claims = Claims {
            sub: "admin@example.com".to_string(),
            role: "admin".to_string(),
            iat: issued.timestamp() as usize,
            exp: (issued + chrono::TimeDelta::hours(1)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(cfg.jwt_secret.as_bytes()),
        )
        .unwrap();
        assert!(verify_token(&cfg, &token).is_err());
    }

    #[test]
    fn test_token_expiry_follows_configured_ttl() {
        let cfg = config("unit-test-secret", 12);
        let token = issue_token(&cfg, "admin@example.com", "admin").unwrap();
        let claims = verify_token(&cfg, &token).unwrap();
        assert_eq!(claims.exp - claims.iat, 12 * 3600);
    }

    #[test]
    fn test_out_of_range_ttl_is_an_error_not_a_panic() {
        let cfg = config("unit-test-secret", u32::MAX);
        let result = issue_token(&cfg, "admin@example.com", "admin");
        assert!(matches!(result, Err(InventoryError::Config(_))));
    }
}

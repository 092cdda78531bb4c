use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Account;
use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Signs a bearer token for `account`, valid for `ttl_minutes`.
pub fn mint_token(account: Uuid, secret: &str, ttl_minutes: i64) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: account,
        iat: now.timestamp(),
        exp: (now + chrono::Duration::minutes(ttl_minutes)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| ApiError::Internal(anyhow::Error::new(err)))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|err| match err.kind() {
        ErrorKind::ExpiredSignature => {
            ApiError::Auth("Token has expired. Please login again.".to_string())
        }
        _ => ApiError::Auth("Invalid token.".to_string()),
    })
}

struct WindowState {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window request limiter keyed by account.
#[derive(Clone)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    hits: Arc<Mutex<HashMap<Uuid, WindowState>>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
            hits: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Counts a hit and reports whether the caller is still within budget.
    pub fn check(&self, key: Uuid) -> bool {
        let now = Instant::now();
        let mut hits = self.hits.lock().unwrap();
        let state = hits.entry(key).or_insert(WindowState {
            count: 0,
            reset_at: now + self.window,
        });
        if now > state.reset_at {
            state.count = 0;
            state.reset_at = now + self.window;
        }
        state.count += 1;
        state.count <= self.max_requests
    }
}

/// Resolved bearer identity. Extracting this is what makes a route
/// authenticated; every scoped read and write keys off the contained account.
pub struct AuthAccount(pub Account);

#[async_trait]
impl FromRequestParts<AppState> for AuthAccount {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let token = match header {
            Some(value) if value.starts_with("Bearer ") => &value["Bearer ".len()..],
            _ => {
                return Err(ApiError::Auth(
                    "Access denied. No token provided.".to_string(),
                ))
            }
        };

        let claims = verify_token(token, &state.auth.secret)?;

        let account = state
            .storage
            .get_account(claims.sub)
            .await?
            .ok_or_else(|| ApiError::Auth("Token is invalid. User not found.".to_string()))?;

        if !account.active {
            return Err(ApiError::Auth(
                "Account is deactivated. Please contact administrator.".to_string(),
            ));
        }
        if account.locked {
            return Err(ApiError::Locked(
                "Account is temporarily locked due to multiple failed login attempts.".to_string(),
            ));
        }
        if !state.auth.limiter.check(account.id) {
            return Err(ApiError::RateLimited(
                "Too many requests. Please try again later.".to_string(),
            ));
        }

        Ok(AuthAccount(account))
    }
}

// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Authentication and authorization
//!
//! Session tokens are stateless HS256 JWTs. They are read from the `token`
//! cookie first and from an `Authorization: Bearer` header otherwise.

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;
use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "token";

/// Secret used when none is configured. Never suitable for production.
pub const DEVELOPMENT_JWT_SECRET: &str = "dev-secret-change-in-prod";

const WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Authentication configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::with_jwt_secret(DEVELOPMENT_JWT_SECRET.to_string())
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &tb_logging::redact(&self.jwt_secret))
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl AuthConfig {
    /// Create auth config from JWT secret
    pub fn with_jwt_secret(secret: String) -> Self {
        Self {
            jwt_secret: secret,
            token_ttl: WEEK,
        }
    }

    pub fn uses_development_secret(&self) -> bool {
        self.jwt_secret == DEVELOPMENT_JWT_SECRET
    }

    /// Issue a session token for a user, valid for `token_ttl`
    pub fn issue_token(&self, user_id: &str) -> ServerResult<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ServerError::Internal(format!("system clock before epoch: {e}")))?;
        self.issue_token_at(user_id, now.as_secs())
    }

    fn issue_token_at(&self, user_id: &str, issued_at: u64) -> ServerResult<String> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at,
            exp: issued_at + self.token_ttl.as_secs(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServerError::Internal(format!("failed to sign token: {e}")))
    }

    /// Validate JWT token
    pub fn validate_jwt(&self, token: &str) -> Result<Claims, ServerError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        let validation = Validation::default();

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|_| ServerError::Auth("Invalid token".to_string()))?;

        Ok(token_data.claims)
    }

    /// Build the session cookie carrying `token`
    pub fn session_cookie(&self, token: String, secure: bool) -> Cookie<'static> {
        let max_age = time::Duration::seconds(self.token_ttl.as_secs() as i64);
        Cookie::build((SESSION_COOKIE, token))
            .http_only(true)
            .secure(secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(max_age)
            .build()
    }
}

/// Empty, already-expired session cookie sent on logout
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub iat: u64,
    pub exp: u64,
}

/// Identity resolved by the session gate, available to handlers as a
/// request extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

/// Extract a session token from the cookie jar, falling back to a bearer header
pub fn session_token(jar: &CookieJar, headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Session gate: rejects requests without a valid token and attaches the
/// caller's identity otherwise
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let Some(token) = session_token(&jar, req.headers()) else {
        return ServerError::Auth("Unauthorized".to_string()).into_response();
    };

    match state.auth().validate_jwt(&token) {
        Ok(claims) => {
            req.extensions_mut().insert(AuthenticatedUser {
                user_id: claims.sub,
            });
            next.run(req).await
        }
        Err(err) => {
            tracing::debug!("rejected request with invalid session token");
            err.into_response()
        }
    }
}

/// Hash a password with Argon2id on the blocking pool
pub async fn hash_password(password: String) -> ServerResult<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
    })
    .await?
    .map_err(|e| ServerError::Internal(format!("password hashing failed: {e}")))
}

/// Check a password against a stored PHC hash on the blocking pool
pub async fn verify_password(password: String, password_hash: String) -> ServerResult<bool> {
    let verified = tokio::task::spawn_blocking(move || match PasswordHash::new(&password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    })
    .await?;
    Ok(verified)
}

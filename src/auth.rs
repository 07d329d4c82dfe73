// ABOUTME: Bearer token validation for requests authenticated by the external identity service
// ABOUTME: Verifies HS256 JWTs and resolves the calling user, with optional-auth support for reads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Authentication
//!
//! Token issuance lives in the external identity service; this module only
//! validates the `Authorization: Bearer` tokens it signs (HS256, shared
//! secret) and resolves them to a caller identity. Read endpoints accept
//! anonymous callers through [`AuthManager::authenticate_optional`].

use crate::errors::{AppError, AppResult};
use axum::http::HeaderMap;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Detailed JWT validation error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token has expired
    TokenExpired,
    /// Token signature is invalid or claims are inconsistent
    TokenInvalid {
        /// Reason the token failed validation
        reason: String,
    },
    /// Token is structurally malformed
    TokenMalformed {
        /// Parser detail
        details: String,
    },
}

impl std::fmt::Display for JwtValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TokenExpired => {
                write!(f, "JWT token has expired")
            }
            Self::TokenInvalid { reason } => {
                write!(f, "JWT token is invalid: {reason}")
            }
            Self::TokenMalformed { details } => {
                write!(f, "JWT token is malformed: {details}")
            }
        }
    }
}

impl std::error::Error for JwtValidationError {}

/// `JWT` claims issued by the identity service
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// User email
    pub email: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Authentication result with user context
#[derive(Debug, Clone, Copy)]
pub struct AuthResult {
    /// Authenticated user `ID`
    pub user_id: Uuid,
}

/// Validates bearer tokens issued by the external identity service
#[derive(Clone)]
pub struct AuthManager {
    decoding_key: DecodingKey,
}

impl AuthManager {
    /// Create a new authentication manager from the shared signing secret
    #[must_use]
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
        }
    }

    /// Validate a bearer token and extract its claims
    ///
    /// # Errors
    ///
    /// Returns an error if the signature is invalid, the token has expired,
    /// or it is not valid JWT format.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    JwtValidationError::TokenExpired
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::Base64(_)
                | jsonwebtoken::errors::ErrorKind::Json(_)
                | jsonwebtoken::errors::ErrorKind::Utf8(_) => JwtValidationError::TokenMalformed {
                    details: e.to_string(),
                },
                _ => JwtValidationError::TokenInvalid {
                    reason: e.to_string(),
                },
            })
    }

    /// Authenticate a request from its headers; fails if no valid token
    ///
    /// # Errors
    ///
    /// Returns 401 [`AppError`] if the Authorization header is missing,
    /// not a bearer token, or fails validation.
    pub fn authenticate(&self, headers: &HeaderMap) -> AppResult<AuthResult> {
        let token = bearer_token(headers).ok_or_else(AppError::auth_required)?;

        let claims = self
            .validate_token(token)
            .map_err(|e| AppError::auth_invalid(e.to_string()))?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::auth_invalid("Token subject is not a valid user id"))?;

        Ok(AuthResult { user_id })
    }

    /// Authenticate a request if credentials are present
    ///
    /// Anonymous requests (no Authorization header) resolve to `None`; a
    /// header that is present but invalid is still an error, so a client
    /// with a stale token is told so instead of silently downgraded.
    ///
    /// # Errors
    ///
    /// Returns 401 [`AppError`] if a token is present but invalid.
    pub fn authenticate_optional(&self, headers: &HeaderMap) -> AppResult<Option<AuthResult>> {
        if bearer_token(headers).is_none() {
            return Ok(None);
        }
        self.authenticate(headers).map(Some)
    }
}

/// Extract the bearer token from the Authorization header, if any
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn mint(sub: &str, exp_offset: Duration) -> String {
        let now = Utc::now();
        let claims = Claims {
            sub: sub.to_owned(),
            email: "user@example.com".to_owned(),
            iat: now.timestamp(),
            exp: (now + exp_offset).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn headers_with(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        headers
    }

    #[test]
    fn test_valid_token_resolves_user() {
        let manager = AuthManager::new(SECRET);
        let user_id = Uuid::new_v4();
        let token = mint(&user_id.to_string(), Duration::hours(1));

        let auth = manager.authenticate(&headers_with(&token)).unwrap();
        assert_eq!(auth.user_id, user_id);
    }

    #[test]
    fn test_expired_token_rejected() {
        let manager = AuthManager::new(SECRET);
        let token = mint(&Uuid::new_v4().to_string(), Duration::hours(-1));

        let result = manager.authenticate(&headers_with(&token));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_header_is_anonymous_for_optional_auth() {
        let manager = AuthManager::new(SECRET);
        let auth = manager.authenticate_optional(&HeaderMap::new()).unwrap();
        assert!(auth.is_none());
    }

    #[test]
    fn test_invalid_token_is_error_even_for_optional_auth() {
        let manager = AuthManager::new(SECRET);
        let result = manager.authenticate_optional(&headers_with("garbage"));
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let manager = AuthManager::new("other-secret");
        let token = mint(&Uuid::new_v4().to_string(), Duration::hours(1));
        assert!(manager.authenticate(&headers_with(&token)).is_err());
    }
}

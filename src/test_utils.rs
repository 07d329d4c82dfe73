// ABOUTME: Test utilities for creating domain structs and tokens in a consistent way
// ABOUTME: Centralizes test data creation to avoid duplication across tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

use crate::auth::Claims;
use crate::models::{Ingredient, Tag, User};

/// Create a test regular user with default values
#[must_use]
pub fn create_test_user(email: &str, username: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.to_owned(),
        username: username.to_owned(),
        first_name: "Test".to_owned(),
        last_name: "User".to_owned(),
        is_admin: false,
        created_at: Utc::now(),
    }
}

/// Create a test admin user with default values
#[must_use]
pub fn create_test_admin_user(email: &str, username: &str) -> User {
    User {
        is_admin: true,
        ..create_test_user(email, username)
    }
}

/// Create a test tag
#[must_use]
pub fn create_test_tag(name: &str, slug: &str) -> Tag {
    Tag {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        color: "#49B64E".to_owned(),
        slug: slug.to_owned(),
    }
}

/// Create a test ingredient
#[must_use]
pub fn create_test_ingredient(name: &str, measurement_unit: &str) -> Ingredient {
    Ingredient {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        measurement_unit: measurement_unit.to_owned(),
    }
}

/// Mint a bearer token the way the external identity service would
///
/// Production code only validates tokens; issuance exists here solely so
/// tests can act as authenticated callers.
///
/// # Panics
///
/// Panics if JWT encoding fails (test-only code).
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn mint_test_token(user_id: Uuid, email: &str, secret: &str) -> String {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_owned(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(1)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

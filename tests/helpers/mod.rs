// ABOUTME: Shared test helpers and fixtures for integration tests
// ABOUTME: In-memory database setup, resource wiring, and a fake image store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(dead_code)]

pub mod axum_test;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine};
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

use ladle::auth::AuthManager;
use ladle::config::environment::{LogLevel, ServerConfig};
use ladle::database::{create_schema, Database};
use ladle::errors::{AppError, AppResult};
use ladle::media::ImageStore;
use ladle::models::{Ingredient, Recipe, Tag, User};
use ladle::resources::ServerResources;
use ladle::test_utils::mint_test_token;

/// Signing secret shared by every test token
pub const TEST_JWT_SECRET: &str = "test-jwt-secret";

/// Create an in-memory test database with the full schema
///
/// A single connection keeps every query on the same in-memory database.
pub async fn create_test_db() -> Database {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    create_schema(&pool).await.expect("Failed to create schema");

    Database::from_pool(pool)
}

/// Image store that validates base64 but keeps nothing on disk
pub struct FakeImageStore;

#[async_trait]
impl ImageStore for FakeImageStore {
    async fn store_base64(&self, payload: &str) -> AppResult<String> {
        let body = payload
            .split_once(";base64,")
            .map_or(payload, |(_, body)| body);
        general_purpose::STANDARD
            .decode(body.trim())
            .map_err(|e| AppError::validation("image", format!("Invalid base64 image: {e}")))?;
        Ok(format!("media/{}.png", Uuid::new_v4()))
    }
}

/// Configuration used by route-level tests
pub fn test_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        database_url: "sqlite::memory:".to_owned(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        media_dir: PathBuf::from("/tmp/ladle-test-media"),
        log_level: LogLevel::Info,
    }
}

/// Bundle a database into server resources with test auth and fake storage
pub fn test_resources(database: Database) -> Arc<ServerResources> {
    Arc::new(ServerResources::new(
        database,
        AuthManager::new(TEST_JWT_SECRET),
        Arc::new(FakeImageStore),
        Arc::new(test_config()),
    ))
}

/// Insert a user row and return it
pub async fn seed_user(db: &Database, user: &User) {
    db.users().create(user).await.expect("Failed to seed user");
}

/// Insert a tag row
pub async fn seed_tag(db: &Database, tag: &Tag) {
    db.catalog().insert_tag(tag).await.expect("Failed to seed tag");
}

/// Insert an ingredient row
pub async fn seed_ingredient(db: &Database, ingredient: &Ingredient) {
    db.catalog()
        .insert_ingredient(ingredient)
        .await
        .expect("Failed to seed ingredient");
}

/// Insert a bare recipe row for membership tests, bypassing validation
pub async fn seed_recipe_row(db: &Database, recipe: &Recipe) {
    sqlx::query(
        "INSERT INTO recipes (id, author_id, name, image, text, cooking_time, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(recipe.id.to_string())
    .bind(recipe.author_id.to_string())
    .bind(&recipe.name)
    .bind(&recipe.image)
    .bind(&recipe.text)
    .bind(recipe.cooking_time)
    .bind(recipe.created_at.to_rfc3339())
    .execute(db.pool())
    .await
    .expect("Failed to seed recipe");
}

/// Bearer header value for a user
pub fn bearer_for(user: &User) -> String {
    format!(
        "Bearer {}",
        mint_test_token(user.id, &user.email, TEST_JWT_SECRET)
    )
}

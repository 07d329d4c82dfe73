// ABOUTME: Database management for the Ladle recipe API
// ABOUTME: SQLite pool setup, idempotent schema migration, and per-domain manager accessors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Database Management
//!
//! One [`Database`] wraps the `SQLite` pool and hands out per-domain
//! managers. The schema is created idempotently at startup; uniqueness of
//! membership pairs is enforced by `UNIQUE`/`PRIMARY KEY` constraints so
//! concurrent duplicate inserts race safely at the storage layer.

use anyhow::Result;
use sqlx::SqlitePool;

/// Catalog reference data operations (tags, ingredients)
pub mod catalog;
/// Membership sets: favorites, shopping cart, follows
pub mod memberships;
/// Recipe aggregate operations
pub mod recipes;
/// Shopping-list aggregation and rendering
pub mod shopping_list;
/// Transaction guard with rollback-on-drop
pub mod transactions;
/// User account operations
pub mod users;

pub use catalog::CatalogManager;
pub use memberships::{MembershipLookup, MembershipsManager};
pub use recipes::RecipesManager;
pub use shopping_list::ShoppingListManager;
pub use users::UsersManager;

/// Database manager owning the connection pool
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or migration fails.
    pub async fn new(database_url: &str) -> Result<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:")
            && !database_url.contains(":memory:")
            && !database_url.contains("mode=")
        {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_owned()
        };

        let pool = SqlitePool::connect(&connection_options).await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Wrap an existing pool without running migrations
    ///
    /// Callers are responsible for the schema; used by tests that build
    /// their own in-memory pools.
    #[must_use]
    pub const fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Access the underlying pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// User account operations
    #[must_use]
    pub fn users(&self) -> UsersManager {
        UsersManager::new(self.pool.clone())
    }

    /// Tag and ingredient catalog operations
    #[must_use]
    pub fn catalog(&self) -> CatalogManager {
        CatalogManager::new(self.pool.clone())
    }

    /// Recipe aggregate operations
    #[must_use]
    pub fn recipes(&self) -> RecipesManager {
        RecipesManager::new(self.pool.clone())
    }

    /// Membership set operations
    #[must_use]
    pub fn memberships(&self) -> MembershipsManager {
        MembershipsManager::new(self.pool.clone())
    }

    /// Shopping-list aggregation
    #[must_use]
    pub fn shopping_list(&self) -> ShoppingListManager {
        ShoppingListManager::new(self.pool.clone())
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any schema statement fails.
    pub async fn migrate(&self) -> Result<()> {
        create_schema(&self.pool).await
    }
}

/// Create all tables and indexes if they do not exist
///
/// # Errors
///
/// Returns an error if any schema statement fails.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT UNIQUE NOT NULL,
            username TEXT UNIQUE NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            is_admin INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
        .execute(pool)
        .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS tags (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            slug TEXT UNIQUE NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS ingredients (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            measurement_unit TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_ingredients_name ON ingredients(name)")
        .execute(pool)
        .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS recipes (
            id TEXT PRIMARY KEY,
            author_id TEXT NOT NULL,
            name TEXT NOT NULL,
            image TEXT NOT NULL,
            text TEXT NOT NULL,
            cooking_time INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_recipes_author ON recipes(author_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_recipes_created ON recipes(created_at)")
        .execute(pool)
        .await?;

    // Ingredient lines: duplicates by ingredient forbidden within one recipe
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS recipe_ingredients (
            recipe_id TEXT NOT NULL,
            ingredient_id TEXT NOT NULL,
            amount INTEGER NOT NULL CHECK (amount > 0),
            PRIMARY KEY (recipe_id, ingredient_id),
            FOREIGN KEY (recipe_id) REFERENCES recipes(id) ON DELETE CASCADE,
            FOREIGN KEY (ingredient_id) REFERENCES ingredients(id)
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS recipe_tags (
            recipe_id TEXT NOT NULL,
            tag_id TEXT NOT NULL,
            PRIMARY KEY (recipe_id, tag_id),
            FOREIGN KEY (recipe_id) REFERENCES recipes(id) ON DELETE CASCADE,
            FOREIGN KEY (tag_id) REFERENCES tags(id)
        )
        ",
    )
    .execute(pool)
    .await?;

    // Membership sets: the UNIQUE pair constraint is the race-safety
    // mechanism for concurrent duplicate adds
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS favorites (
            user_id TEXT NOT NULL,
            recipe_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (user_id, recipe_id),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (recipe_id) REFERENCES recipes(id) ON DELETE CASCADE
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS shopping_cart (
            user_id TEXT NOT NULL,
            recipe_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (user_id, recipe_id),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (recipe_id) REFERENCES recipes(id) ON DELETE CASCADE
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS follows (
            user_id TEXT NOT NULL,
            author_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (user_id, author_id),
            CHECK (user_id <> author_id),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
        )
        ",
    )
    .execute(pool)
    .await?;

    Ok(())
}

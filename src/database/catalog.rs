// ABOUTME: Database operations for the tag and ingredient catalogs
// ABOUTME: Read-only reference data with case-insensitive ingredient search and seed inserts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{Ingredient, Tag};

/// Catalog database operations manager
///
/// Tags and ingredients are static reference data: seeded once by the
/// `seed-catalog` binary, read-only thereafter.
pub struct CatalogManager {
    pool: SqlitePool,
}

impl CatalogManager {
    /// Create a new catalog manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Tags
    // ========================================================================

    /// List all tags
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_tags(&self) -> AppResult<Vec<Tag>> {
        let rows = sqlx::query("SELECT id, name, color, slug FROM tags ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list tags: {e}")))?;

        rows.iter().map(row_to_tag).collect()
    }

    /// Get a tag by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_tag(&self, tag_id: Uuid) -> AppResult<Option<Tag>> {
        let row = sqlx::query("SELECT id, name, color, slug FROM tags WHERE id = $1")
            .bind(tag_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get tag: {e}")))?;

        row.map(|r| row_to_tag(&r)).transpose()
    }

    /// Insert a tag (seeding only)
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert_tag(&self, tag: &Tag) -> AppResult<()> {
        sqlx::query("INSERT INTO tags (id, name, color, slug) VALUES ($1, $2, $3, $4)")
            .bind(tag.id.to_string())
            .bind(&tag.name)
            .bind(&tag.color)
            .bind(&tag.slug)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to insert tag: {e}")))?;

        Ok(())
    }

    /// Get total number of tags
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_tags(&self) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM tags")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count tags: {e}")))?;

        Ok(row.get("count"))
    }

    // ========================================================================
    // Ingredients
    // ========================================================================

    /// List ingredients, optionally filtered by a case-insensitive
    /// substring match on name
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn search_ingredients(&self, name: Option<&str>) -> AppResult<Vec<Ingredient>> {
        let rows = match name {
            Some(fragment) => {
                let pattern = format!("%{}%", fragment.to_lowercase());
                sqlx::query(
                    r"
                    SELECT id, name, measurement_unit
                    FROM ingredients
                    WHERE LOWER(name) LIKE $1
                    ORDER BY name ASC
                    ",
                )
                .bind(pattern)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT id, name, measurement_unit FROM ingredients ORDER BY name ASC",
                )
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| AppError::database(format!("Failed to search ingredients: {e}")))?;

        rows.iter().map(row_to_ingredient).collect()
    }

    /// Get an ingredient by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_ingredient(&self, ingredient_id: Uuid) -> AppResult<Option<Ingredient>> {
        let row =
            sqlx::query("SELECT id, name, measurement_unit FROM ingredients WHERE id = $1")
                .bind(ingredient_id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to get ingredient: {e}")))?;

        row.map(|r| row_to_ingredient(&r)).transpose()
    }

    /// Count how many of the given ingredient ids exist in the catalog
    ///
    /// Used by recipe validation to reject references to unknown
    /// ingredients in one query instead of N lookups.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_existing_ingredients(&self, ids: &[Uuid]) -> AppResult<i64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders = (1..=ids.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!("SELECT COUNT(*) as count FROM ingredients WHERE id IN ({placeholders})");

        let mut q = sqlx::query(&query);
        for id in ids {
            q = q.bind(id.to_string());
        }

        let row = q
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count ingredients: {e}")))?;

        Ok(row.get("count"))
    }

    /// Count how many of the given tag ids exist in the catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_existing_tags(&self, ids: &[Uuid]) -> AppResult<i64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders = (1..=ids.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!("SELECT COUNT(*) as count FROM tags WHERE id IN ({placeholders})");

        let mut q = sqlx::query(&query);
        for id in ids {
            q = q.bind(id.to_string());
        }

        let row = q
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count tags: {e}")))?;

        Ok(row.get("count"))
    }

    /// Insert an ingredient (seeding only)
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn insert_ingredient(&self, ingredient: &Ingredient) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO ingredients (id, name, measurement_unit) VALUES ($1, $2, $3)",
        )
        .bind(ingredient.id.to_string())
        .bind(&ingredient.name)
        .bind(&ingredient.measurement_unit)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert ingredient: {e}")))?;

        Ok(())
    }

    /// Get total number of ingredients
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_ingredients(&self) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM ingredients")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count ingredients: {e}")))?;

        Ok(row.get("count"))
    }
}

fn row_to_tag(row: &SqliteRow) -> AppResult<Tag> {
    let id: String = row.get("id");
    Ok(Tag {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::database(format!("Invalid tag id in database: {e}")))?,
        name: row.get("name"),
        color: row.get("color"),
        slug: row.get("slug"),
    })
}

fn row_to_ingredient(row: &SqliteRow) -> AppResult<Ingredient> {
    let id: String = row.get("id");
    Ok(Ingredient {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::database(format!("Invalid ingredient id in database: {e}")))?,
        name: row.get("name"),
        measurement_unit: row.get("measurement_unit"),
    })
}

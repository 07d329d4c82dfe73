// ABOUTME: Database operations for the recipe aggregate
// ABOUTME: Transactional create/update with full line and tag set replacement, filtered listing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Recipe aggregate operations
//!
//! A recipe owns its ingredient lines and tag links. Create and update run
//! in one transaction so the delete-and-reinsert replacement of both sets
//! is invisible to concurrent readers: either the old complete recipe or
//! the new complete recipe, never a cleared-but-unrepopulated state.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::database::catalog::CatalogManager;
use crate::database::transactions::TransactionGuard;
use crate::errors::{AppError, AppResult};
use crate::models::{IngredientAmount, IngredientLine, Recipe, Tag};

/// Request to create a recipe
///
/// The image field carries the stored asset path; base64 decoding happens
/// in the HTTP layer before this request is built. The author comes from
/// the authenticated caller, never from the client payload.
#[derive(Debug, Clone)]
pub struct CreateRecipeRequest {
    /// Recipe name
    pub name: String,
    /// Stored path of the decoded image asset
    pub image: String,
    /// Free-form preparation text
    pub text: String,
    /// Cooking time in minutes
    pub cooking_time: i64,
    /// Tag ids to associate
    pub tags: Vec<Uuid>,
    /// Ingredient lines
    pub ingredients: Vec<IngredientLine>,
}

/// Request to update a recipe; `None` fields are left unchanged
///
/// Supplied `tags`/`ingredients` replace the full set, never patch it.
#[derive(Debug, Clone, Default)]
pub struct UpdateRecipeRequest {
    /// New name, if provided
    pub name: Option<String>,
    /// New stored image path, if provided
    pub image: Option<String>,
    /// New preparation text, if provided
    pub text: Option<String>,
    /// New cooking time, if provided
    pub cooking_time: Option<i64>,
    /// Replacement tag set, if provided
    pub tags: Option<Vec<Uuid>>,
    /// Replacement ingredient-line set, if provided
    pub ingredients: Option<Vec<IngredientLine>>,
}

/// Compact recipe representation for membership toggle responses and
/// subscription listings
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RecipeSummary {
    /// Recipe identifier
    pub id: Uuid,
    /// Recipe name
    pub name: String,
    /// Stored image path
    pub image: String,
    /// Cooking time in minutes
    pub cooking_time: i64,
}

/// Conjunctive filter over the recipe collection
///
/// Membership restrictions (`favorited_by`, `in_cart_of`) are applied only
/// when set; the HTTP layer maps `is_favorited=true` plus the caller to
/// `favorited_by` and drops false/absent values entirely, so a false flag
/// never selects the complement set.
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    /// Restrict to these author ids (multi-select, OR within the set)
    pub authors: Vec<Uuid>,
    /// Restrict to recipes carrying any of these tag slugs
    pub tag_slugs: Vec<String>,
    /// Restrict to recipes favorited by this user
    pub favorited_by: Option<Uuid>,
    /// Restrict to recipes in this user's shopping cart
    pub in_cart_of: Option<Uuid>,
    /// Page size
    pub limit: Option<u32>,
    /// Page offset
    pub offset: Option<u32>,
}

/// Recipe database operations manager
pub struct RecipesManager {
    pool: SqlitePool,
}

impl RecipesManager {
    /// Create a new recipes manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new recipe with its tag links and ingredient lines
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty or duplicated ingredient
    /// list, non-positive amounts or cooking time, or references to unknown
    /// tags/ingredients; a database error otherwise.
    pub async fn create(&self, author_id: Uuid, request: &CreateRecipeRequest) -> AppResult<Recipe> {
        validate_ingredient_lines(&request.ingredients)?;
        validate_cooking_time(request.cooking_time)?;
        self.validate_references(&request.tags, &request.ingredients)
            .await?;

        let recipe = Recipe::new(
            author_id,
            request.name.clone(),
            request.image.clone(),
            request.text.clone(),
            request.cooking_time,
        );

        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        let mut guard = TransactionGuard::<Sqlite>::new(tx);

        sqlx::query(
            r"
            INSERT INTO recipes (id, author_id, name, image, text, cooking_time, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(recipe.id.to_string())
        .bind(recipe.author_id.to_string())
        .bind(&recipe.name)
        .bind(&recipe.image)
        .bind(&recipe.text)
        .bind(recipe.cooking_time)
        .bind(recipe.created_at.to_rfc3339())
        .execute(guard.executor()?)
        .await
        .map_err(|e| AppError::database(format!("Failed to create recipe: {e}")))?;

        insert_tag_links(&mut guard, recipe.id, &request.tags).await?;
        insert_ingredient_lines(&mut guard, recipe.id, &request.ingredients).await?;

        guard.commit().await?;

        Ok(recipe)
    }

    /// Update a recipe, replacing supplied field values and sets atomically
    ///
    /// # Errors
    ///
    /// Returns not-found if the recipe does not exist, validation errors as
    /// for create, or a database error. On any failure the original recipe
    /// is left unmodified.
    pub async fn update(&self, recipe_id: Uuid, request: &UpdateRecipeRequest) -> AppResult<Recipe> {
        let existing = self.get_required(recipe_id).await?;

        if let Some(lines) = &request.ingredients {
            validate_ingredient_lines(lines)?;
        }
        if let Some(cooking_time) = request.cooking_time {
            validate_cooking_time(cooking_time)?;
        }
        self.validate_references(
            request.tags.as_deref().unwrap_or(&[]),
            request.ingredients.as_deref().unwrap_or(&[]),
        )
        .await?;

        let updated = Recipe {
            id: existing.id,
            author_id: existing.author_id,
            name: request.name.clone().unwrap_or(existing.name),
            image: request.image.clone().unwrap_or(existing.image),
            text: request.text.clone().unwrap_or(existing.text),
            cooking_time: request.cooking_time.unwrap_or(existing.cooking_time),
            created_at: existing.created_at,
        };

        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;
        let mut guard = TransactionGuard::<Sqlite>::new(tx);

        sqlx::query(
            r"
            UPDATE recipes
            SET name = $1, image = $2, text = $3, cooking_time = $4
            WHERE id = $5
            ",
        )
        .bind(&updated.name)
        .bind(&updated.image)
        .bind(&updated.text)
        .bind(updated.cooking_time)
        .bind(updated.id.to_string())
        .execute(guard.executor()?)
        .await
        .map_err(|e| AppError::database(format!("Failed to update recipe: {e}")))?;

        if let Some(tags) = &request.tags {
            sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
                .bind(recipe_id.to_string())
                .execute(guard.executor()?)
                .await
                .map_err(|e| AppError::database(format!("Failed to clear recipe tags: {e}")))?;
            insert_tag_links(&mut guard, recipe_id, tags).await?;
        }

        if let Some(lines) = &request.ingredients {
            sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
                .bind(recipe_id.to_string())
                .execute(guard.executor()?)
                .await
                .map_err(|e| {
                    AppError::database(format!("Failed to clear ingredient lines: {e}"))
                })?;
            insert_ingredient_lines(&mut guard, recipe_id, lines).await?;
        }

        guard.commit().await?;

        Ok(updated)
    }

    /// Delete a recipe; favorites, cart entries, lines, and tag links
    /// cascade at the schema level
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn delete(&self, recipe_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(recipe_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete recipe: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Get a recipe row by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, recipe_id: Uuid) -> AppResult<Option<Recipe>> {
        let row = sqlx::query(
            r"
            SELECT id, author_id, name, image, text, cooking_time, created_at
            FROM recipes
            WHERE id = $1
            ",
        )
        .bind(recipe_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get recipe: {e}")))?;

        row.map(|r| row_to_recipe(&r)).transpose()
    }

    /// Get a recipe row by ID, failing with 404 if absent
    ///
    /// # Errors
    ///
    /// Returns a not-found error if no such recipe exists.
    pub async fn get_required(&self, recipe_id: Uuid) -> AppResult<Recipe> {
        self.get(recipe_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Recipe {recipe_id}")))
    }

    /// Tags associated with a recipe
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn tags_for(&self, recipe_id: Uuid) -> AppResult<Vec<Tag>> {
        let rows = sqlx::query(
            r"
            SELECT t.id, t.name, t.color, t.slug
            FROM tags t
            JOIN recipe_tags rt ON rt.tag_id = t.id
            WHERE rt.recipe_id = $1
            ORDER BY t.name ASC
            ",
        )
        .bind(recipe_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get recipe tags: {e}")))?;

        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                Ok(Tag {
                    id: Uuid::parse_str(&id).map_err(|e| {
                        AppError::database(format!("Invalid tag id in database: {e}"))
                    })?,
                    name: row.get("name"),
                    color: row.get("color"),
                    slug: row.get("slug"),
                })
            })
            .collect()
    }

    /// Ingredient lines of a recipe expanded with catalog data
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn lines_for(&self, recipe_id: Uuid) -> AppResult<Vec<IngredientAmount>> {
        let rows = sqlx::query(
            r"
            SELECT i.id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = $1
            ORDER BY i.name ASC
            ",
        )
        .bind(recipe_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get ingredient lines: {e}")))?;

        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                Ok(IngredientAmount {
                    id: Uuid::parse_str(&id).map_err(|e| {
                        AppError::database(format!("Invalid ingredient id in database: {e}"))
                    })?,
                    name: row.get("name"),
                    measurement_unit: row.get("measurement_unit"),
                    amount: row.get("amount"),
                })
            })
            .collect()
    }

    /// List recipes matching the filter, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, filter: &RecipeFilter) -> AppResult<Vec<Recipe>> {
        let (where_clause, binds) = build_filter_clause(filter);
        let limit = i64::from(filter.limit.unwrap_or(50));
        let offset = i64::from(filter.offset.unwrap_or(0));

        let query = format!(
            r"
            SELECT r.id, r.author_id, r.name, r.image, r.text, r.cooking_time, r.created_at
            FROM recipes r
            {where_clause}
            ORDER BY r.created_at DESC, r.id DESC
            LIMIT ? OFFSET ?
            "
        );

        let mut q = sqlx::query(&query);
        for value in &binds {
            q = q.bind(value);
        }
        q = q.bind(limit).bind(offset);

        let rows = q
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list recipes: {e}")))?;

        rows.iter().map(row_to_recipe).collect()
    }

    /// Count recipes matching the filter (ignoring pagination)
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count(&self, filter: &RecipeFilter) -> AppResult<i64> {
        let (where_clause, binds) = build_filter_clause(filter);
        let query = format!("SELECT COUNT(*) as count FROM recipes r {where_clause}");

        let mut q = sqlx::query(&query);
        for value in &binds {
            q = q.bind(value);
        }

        let row = q
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count recipes: {e}")))?;

        Ok(row.get("count"))
    }

    /// Compact summaries of an author's recipes, newest first, optionally
    /// limited (the subscription listing's `recipes_limit`)
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn summaries_by_author(
        &self,
        author_id: Uuid,
        limit: Option<u32>,
    ) -> AppResult<Vec<RecipeSummary>> {
        let limit = limit.map_or(i64::MAX, i64::from);

        let rows = sqlx::query(
            r"
            SELECT id, name, image, cooking_time
            FROM recipes
            WHERE author_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(author_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list author recipes: {e}")))?;

        rows.iter()
            .map(|row| {
                let id: String = row.get("id");
                Ok(RecipeSummary {
                    id: Uuid::parse_str(&id).map_err(|e| {
                        AppError::database(format!("Invalid recipe id in database: {e}"))
                    })?,
                    name: row.get("name"),
                    image: row.get("image"),
                    cooking_time: row.get("cooking_time"),
                })
            })
            .collect()
    }

    /// Number of recipes an author owns
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_by_author(&self, author_id: Uuid) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM recipes WHERE author_id = $1")
            .bind(author_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count author recipes: {e}")))?;

        Ok(row.get("count"))
    }

    /// Reject references to tags or ingredients absent from the catalog
    async fn validate_references(
        &self,
        tags: &[Uuid],
        lines: &[IngredientLine],
    ) -> AppResult<()> {
        let catalog = CatalogManager::new(self.pool.clone());

        if !tags.is_empty() {
            let found = catalog.count_existing_tags(tags).await?;
            if found != i64::try_from(tags.len()).unwrap_or(i64::MAX) {
                return Err(AppError::validation("tags", "Unknown tag id in list"));
            }
        }

        if !lines.is_empty() {
            let ids: Vec<Uuid> = lines.iter().map(|line| line.ingredient_id).collect();
            let found = catalog.count_existing_ingredients(&ids).await?;
            if found != i64::try_from(ids.len()).unwrap_or(i64::MAX) {
                return Err(AppError::validation(
                    "ingredients",
                    "Unknown ingredient id in list",
                ));
            }
        }

        Ok(())
    }
}

/// Validate an ingredient-line set: non-empty, no duplicate ingredient,
/// positive amounts
fn validate_ingredient_lines(lines: &[IngredientLine]) -> AppResult<()> {
    if lines.is_empty() {
        return Err(AppError::validation(
            "ingredients",
            "At least one ingredient is required",
        ));
    }

    let mut seen = HashSet::with_capacity(lines.len());
    for line in lines {
        if !seen.insert(line.ingredient_id) {
            return Err(AppError::validation(
                "ingredients",
                "Duplicate ingredient in list",
            ));
        }
        if line.amount <= 0 {
            return Err(AppError::validation(
                "ingredients",
                "Ingredient amount must be positive",
            ));
        }
    }

    Ok(())
}

fn validate_cooking_time(cooking_time: i64) -> AppResult<()> {
    if cooking_time <= 0 {
        return Err(AppError::validation(
            "cooking_time",
            "Cooking time must be positive",
        ));
    }
    Ok(())
}

async fn insert_tag_links(
    guard: &mut TransactionGuard<'_, Sqlite>,
    recipe_id: Uuid,
    tags: &[Uuid],
) -> AppResult<()> {
    for tag_id in tags {
        sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES ($1, $2)")
            .bind(recipe_id.to_string())
            .bind(tag_id.to_string())
            .execute(guard.executor()?)
            .await
            .map_err(|e| AppError::database(format!("Failed to link tag: {e}")))?;
    }
    Ok(())
}

async fn insert_ingredient_lines(
    guard: &mut TransactionGuard<'_, Sqlite>,
    recipe_id: Uuid,
    lines: &[IngredientLine],
) -> AppResult<()> {
    for line in lines {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES ($1, $2, $3)",
        )
        .bind(recipe_id.to_string())
        .bind(line.ingredient_id.to_string())
        .bind(line.amount)
        .execute(guard.executor()?)
        .await
        .map_err(|e| AppError::database(format!("Failed to insert ingredient line: {e}")))?;
    }
    Ok(())
}

/// Assemble the WHERE clause and bind values for a recipe filter
///
/// Bound values come back as strings in bind order; the clause uses `?`
/// placeholders so limit/offset can be appended by the caller.
fn build_filter_clause(filter: &RecipeFilter) -> (String, Vec<String>) {
    let mut conditions = Vec::new();
    let mut binds = Vec::new();

    if !filter.authors.is_empty() {
        let placeholders = vec!["?"; filter.authors.len()].join(", ");
        conditions.push(format!("r.author_id IN ({placeholders})"));
        binds.extend(filter.authors.iter().map(Uuid::to_string));
    }

    if !filter.tag_slugs.is_empty() {
        let placeholders = vec!["?"; filter.tag_slugs.len()].join(", ");
        conditions.push(format!(
            "r.id IN (SELECT rt.recipe_id FROM recipe_tags rt \
             JOIN tags t ON t.id = rt.tag_id WHERE t.slug IN ({placeholders}))"
        ));
        binds.extend(filter.tag_slugs.iter().cloned());
    }

    if let Some(user_id) = filter.favorited_by {
        conditions.push("r.id IN (SELECT recipe_id FROM favorites WHERE user_id = ?)".to_owned());
        binds.push(user_id.to_string());
    }

    if let Some(user_id) = filter.in_cart_of {
        conditions
            .push("r.id IN (SELECT recipe_id FROM shopping_cart WHERE user_id = ?)".to_owned());
        binds.push(user_id.to_string());
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, binds)
}

/// Map a database row to a [`Recipe`]
fn row_to_recipe(row: &SqliteRow) -> AppResult<Recipe> {
    let id: String = row.get("id");
    let author_id: String = row.get("author_id");
    let created_at: String = row.get("created_at");

    Ok(Recipe {
        id: Uuid::parse_str(&id)
            .map_err(|e| AppError::database(format!("Invalid recipe id in database: {e}")))?,
        author_id: Uuid::parse_str(&author_id)
            .map_err(|e| AppError::database(format!("Invalid author id in database: {e}")))?,
        name: row.get("name"),
        image: row.get("image"),
        text: row.get("text"),
        cooking_time: row.get("cooking_time"),
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| AppError::database(format!("Invalid timestamp in database: {e}")))?
            .with_timezone(&Utc),
    })
}

// ABOUTME: Shopping-list aggregation over the caller's cart and plain-text rendering
// ABOUTME: Groups ingredient lines by (name, unit), sums amounts, sorts by name
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Shopping-list aggregation
//!
//! Joins the caller's shopping-cart membership set against recipe
//! ingredient lines, groups by (ingredient name, measurement unit) and sums
//! amounts in SQL, then renders the result into the downloadable text
//! document with a pure formatting function.

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Fixed filename of the downloadable attachment
pub const SHOPPING_LIST_FILENAME: &str = "shopping_cart.txt";

/// Header written before the aggregated lines
pub const SHOPPING_LIST_HEADER: &str = "Shopping list:\n\nName - Amount/Unit\n";

/// One aggregated group of the shopping list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListLine {
    /// Ingredient name
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
    /// Sum of amounts across all cart recipes
    pub total: i64,
}

/// Shopping-list database operations manager
pub struct ShoppingListManager {
    pool: SqlitePool,
}

impl ShoppingListManager {
    /// Create a new shopping-list manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Aggregate the ingredient lines of every recipe in the user's cart
    ///
    /// Groups by (name, unit), sums amounts, orders by name ascending. An
    /// empty cart yields an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn aggregate(&self, user_id: Uuid) -> AppResult<Vec<ShoppingListLine>> {
        let rows = sqlx::query(
            r"
            SELECT i.name, i.measurement_unit, SUM(ri.amount) as total
            FROM shopping_cart sc
            JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE sc.user_id = $1
            GROUP BY i.name, i.measurement_unit
            ORDER BY i.name ASC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to aggregate shopping list: {e}")))?;

        Ok(rows
            .iter()
            .map(|row| ShoppingListLine {
                name: row.get("name"),
                measurement_unit: row.get("measurement_unit"),
                total: row.get("total"),
            })
            .collect())
    }
}

/// Render aggregated lines into the plain-text shopping list document
#[must_use]
pub fn render_shopping_list(lines: &[ShoppingListLine]) -> String {
    let body = lines
        .iter()
        .map(|line| format!("{} - {}/{}", line.name, line.total, line.measurement_unit))
        .collect::<Vec<_>>()
        .join("\n");

    format!("{SHOPPING_LIST_HEADER}{body}")
}

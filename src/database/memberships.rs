// ABOUTME: Membership set operations: favorites, shopping cart entries, and follow edges
// ABOUTME: Centralizes per-caller existence checks behind the MembershipLookup trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Membership sets
//!
//! Favorites, shopping-cart entries, and follow edges are all (user, target)
//! pairs with the same contract: add fails if the pair exists, remove fails
//! if it does not, and the pair's `UNIQUE` constraint is the race-safety
//! mechanism for concurrent adds. Existence checks used by read
//! representations go through [`MembershipLookup`] so tests can substitute
//! an in-memory fake.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::errors::{is_unique_violation, AppError, AppResult};

/// Per-caller membership existence checks
///
/// Read paths compute `is_favorited`, `is_in_shopping_cart`, and
/// `is_subscribed` through this interface instead of scattering EXISTS
/// queries across representation builders.
#[async_trait]
pub trait MembershipLookup: Send + Sync {
    /// Whether (user, recipe) is in the favorites set
    async fn exists_favorite(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<bool>;

    /// Whether (user, recipe) is in the shopping-cart set
    async fn exists_in_cart(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<bool>;

    /// Whether (user, author) is in the follow set
    async fn exists_follow(&self, user_id: Uuid, author_id: Uuid) -> AppResult<bool>;
}

/// Compute the `is_subscribed` flag relative to the requesting caller
///
/// Anonymous callers get `false` without a membership query. Shared by the
/// user-profile and subscription representation builders.
///
/// # Errors
///
/// Returns an error if the underlying lookup fails.
pub async fn is_subscribed(
    lookup: &impl MembershipLookup,
    caller: Option<Uuid>,
    author_id: Uuid,
) -> AppResult<bool> {
    match caller {
        Some(user_id) => lookup.exists_follow(user_id, author_id).await,
        None => Ok(false),
    }
}

/// Membership set database operations manager
pub struct MembershipsManager {
    pool: SqlitePool,
}

impl MembershipsManager {
    /// Create a new memberships manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ========================================================================
    // Favorites
    // ========================================================================

    /// Add a recipe to the user's favorites
    ///
    /// # Errors
    ///
    /// Returns an "already exists" error if the pair is present, including
    /// when a concurrent add won the race on the unique constraint.
    pub async fn add_favorite(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<()> {
        insert_pair(
            &self.pool,
            "INSERT INTO favorites (user_id, recipe_id, created_at) VALUES ($1, $2, $3)",
            user_id,
            recipe_id,
            "Recipe is already in favorites",
        )
        .await
    }

    /// Remove a recipe from the user's favorites
    ///
    /// # Errors
    ///
    /// Returns a "not present" error if no such pair exists.
    pub async fn remove_favorite(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<()> {
        delete_pair(
            &self.pool,
            "DELETE FROM favorites WHERE user_id = $1 AND recipe_id = $2",
            user_id,
            recipe_id,
            "Recipe is not in favorites",
        )
        .await
    }

    // ========================================================================
    // Shopping cart
    // ========================================================================

    /// Add a recipe to the user's shopping cart
    ///
    /// # Errors
    ///
    /// Returns an "already exists" error if the pair is present.
    pub async fn add_to_cart(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<()> {
        insert_pair(
            &self.pool,
            "INSERT INTO shopping_cart (user_id, recipe_id, created_at) VALUES ($1, $2, $3)",
            user_id,
            recipe_id,
            "Recipe is already in the shopping cart",
        )
        .await
    }

    /// Remove a recipe from the user's shopping cart
    ///
    /// # Errors
    ///
    /// Returns a "not present" error if no such pair exists.
    pub async fn remove_from_cart(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<()> {
        delete_pair(
            &self.pool,
            "DELETE FROM shopping_cart WHERE user_id = $1 AND recipe_id = $2",
            user_id,
            recipe_id,
            "Recipe is not in the shopping cart",
        )
        .await
    }

    // ========================================================================
    // Follows
    // ========================================================================

    /// Subscribe the user to an author
    ///
    /// # Errors
    ///
    /// Returns a self-reference error if `user_id == author_id`, an
    /// "already exists" error on duplicate subscription.
    pub async fn add_follow(&self, user_id: Uuid, author_id: Uuid) -> AppResult<()> {
        if user_id == author_id {
            return Err(AppError::self_reference("You cannot subscribe to yourself"));
        }

        insert_pair(
            &self.pool,
            "INSERT INTO follows (user_id, author_id, created_at) VALUES ($1, $2, $3)",
            user_id,
            author_id,
            "You are already subscribed to this author",
        )
        .await
    }

    /// Unsubscribe the user from an author
    ///
    /// # Errors
    ///
    /// Returns a self-reference error if `user_id == author_id`, a
    /// "not present" error if no subscription exists.
    pub async fn remove_follow(&self, user_id: Uuid, author_id: Uuid) -> AppResult<()> {
        if user_id == author_id {
            return Err(AppError::self_reference(
                "You cannot unsubscribe from yourself",
            ));
        }

        delete_pair(
            &self.pool,
            "DELETE FROM follows WHERE user_id = $1 AND author_id = $2",
            user_id,
            author_id,
            "You are not subscribed to this author",
        )
        .await
    }

    /// List the authors the user follows, oldest subscription first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_followed_authors(
        &self,
        user_id: Uuid,
        limit: u32,
        offset: u32,
    ) -> AppResult<Vec<Uuid>> {
        let rows = sqlx::query(
            r"
            SELECT author_id
            FROM follows
            WHERE user_id = $1
            ORDER BY created_at ASC, author_id ASC
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id.to_string())
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list subscriptions: {e}")))?;

        rows.iter()
            .map(|row| {
                let id: String = row.get("author_id");
                Uuid::parse_str(&id)
                    .map_err(|e| AppError::database(format!("Invalid author id in database: {e}")))
            })
            .collect()
    }

    /// Count the user's subscriptions
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_follows(&self, user_id: Uuid) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM follows WHERE user_id = $1")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count subscriptions: {e}")))?;

        Ok(row.get("count"))
    }
}

#[async_trait]
impl MembershipLookup for MembershipsManager {
    async fn exists_favorite(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<bool> {
        exists_pair(
            &self.pool,
            "SELECT 1 FROM favorites WHERE user_id = $1 AND recipe_id = $2",
            user_id,
            recipe_id,
        )
        .await
    }

    async fn exists_in_cart(&self, user_id: Uuid, recipe_id: Uuid) -> AppResult<bool> {
        exists_pair(
            &self.pool,
            "SELECT 1 FROM shopping_cart WHERE user_id = $1 AND recipe_id = $2",
            user_id,
            recipe_id,
        )
        .await
    }

    async fn exists_follow(&self, user_id: Uuid, author_id: Uuid) -> AppResult<bool> {
        exists_pair(
            &self.pool,
            "SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2",
            user_id,
            author_id,
        )
        .await
    }
}

async fn exists_pair(pool: &SqlitePool, query: &str, left: Uuid, right: Uuid) -> AppResult<bool> {
    let row = sqlx::query(query)
        .bind(left.to_string())
        .bind(right.to_string())
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::database(format!("Failed membership check: {e}")))?;

    Ok(row.is_some())
}

async fn insert_pair(
    pool: &SqlitePool,
    query: &str,
    left: Uuid,
    right: Uuid,
    conflict_message: &str,
) -> AppResult<()> {
    let result = sqlx::query(query)
        .bind(left.to_string())
        .bind(right.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(pool)
        .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) if is_unique_violation(&e) => Err(AppError::already_exists(conflict_message)),
        Err(e) => Err(AppError::database(format!(
            "Failed to add membership: {e}"
        ))),
    }
}

async fn delete_pair(
    pool: &SqlitePool,
    query: &str,
    left: Uuid,
    right: Uuid,
    missing_message: &str,
) -> AppResult<()> {
    let result = sqlx::query(query)
        .bind(left.to_string())
        .bind(right.to_string())
        .execute(pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to remove membership: {e}")))?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_present(missing_message));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// In-memory lookup: representation builders only need the trait, so
    /// they can be exercised without a database
    #[derive(Default)]
    struct FakeLookup {
        follows: HashSet<(Uuid, Uuid)>,
    }

    #[async_trait]
    impl MembershipLookup for FakeLookup {
        async fn exists_favorite(&self, _user_id: Uuid, _recipe_id: Uuid) -> AppResult<bool> {
            Ok(false)
        }

        async fn exists_in_cart(&self, _user_id: Uuid, _recipe_id: Uuid) -> AppResult<bool> {
            Ok(false)
        }

        async fn exists_follow(&self, user_id: Uuid, author_id: Uuid) -> AppResult<bool> {
            Ok(self.follows.contains(&(user_id, author_id)))
        }
    }

    #[tokio::test]
    async fn test_is_subscribed_with_fake_lookup() {
        let user = Uuid::new_v4();
        let author = Uuid::new_v4();
        let mut lookup = FakeLookup::default();
        lookup.follows.insert((user, author));

        assert!(is_subscribed(&lookup, Some(user), author).await.unwrap());
        assert!(!is_subscribed(&lookup, Some(author), user).await.unwrap());
        assert!(!is_subscribed(&lookup, None, author).await.unwrap());
    }
}

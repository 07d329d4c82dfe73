// ABOUTME: Core data models for the Ladle recipe API
// ABOUTME: Users, catalog reference data, recipes, and membership rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Data Models
//!
//! Domain types shared across the database and HTTP layers. Request and
//! response DTOs live next to the code that uses them (`database/` managers
//! and `routes/` modules); this module holds only the persistent shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user account
///
/// Credential material is not stored here; authentication is delegated to
/// the external identity service and this server only validates its tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// Email address, unique across users
    pub email: String,
    /// Username, unique across users
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Whether this user may mutate recipes they do not own
    pub is_admin: bool,
    /// When the account record was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user record with generated id and current timestamp
    #[must_use]
    pub fn new(email: String, username: String, first_name: String, last_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            username,
            first_name,
            last_name,
            is_admin: false,
            created_at: Utc::now(),
        }
    }
}

/// A recipe tag: immutable reference data seeded once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Unique tag identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Hex color used by clients
    pub color: String,
    /// URL-safe slug, unique across tags
    pub slug: String,
}

/// An ingredient: immutable reference data seeded once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Unique ingredient identifier
    pub id: Uuid,
    /// Display name, searched with case-insensitive substring match
    pub name: String,
    /// Unit the amount is measured in (e.g. "g", "ml")
    pub measurement_unit: String,
}

/// A recipe row without its expanded ingredient/tag sets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Unique recipe identifier
    pub id: Uuid,
    /// Owning author; immutable after creation
    pub author_id: Uuid,
    /// Recipe name
    pub name: String,
    /// Stored path of the decoded image asset
    pub image: String,
    /// Free-form preparation text
    pub text: String,
    /// Cooking time in minutes, always positive
    pub cooking_time: i64,
    /// When the recipe was created
    pub created_at: DateTime<Utc>,
}

impl Recipe {
    /// Create a new recipe row with generated id and current timestamp
    #[must_use]
    pub fn new(author_id: Uuid, name: String, image: String, text: String, cooking_time: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            name,
            image,
            text,
            cooking_time,
            created_at: Utc::now(),
        }
    }
}

/// One (ingredient, amount) entry attached to a recipe
///
/// Duplicates by ingredient are forbidden within one recipe; amounts are
/// always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientLine {
    /// Referenced ingredient
    pub ingredient_id: Uuid,
    /// Integer amount in the ingredient's measurement unit
    pub amount: i64,
}

/// An ingredient line expanded with catalog data for read representations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientAmount {
    /// Ingredient identifier
    pub id: Uuid,
    /// Ingredient name
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
    /// Amount attached to the recipe
    pub amount: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new_defaults() {
        let user = User::new(
            "cook@example.com".into(),
            "cook".into(),
            "Julia".into(),
            "Child".into(),
        );
        assert!(!user.is_admin);
        assert_eq!(user.email, "cook@example.com");
    }

    #[test]
    fn test_recipe_new_assigns_author() {
        let author = Uuid::new_v4();
        let recipe = Recipe::new(author, "Soup".into(), "media/soup.png".into(), "Boil.".into(), 30);
        assert_eq!(recipe.author_id, author);
        assert_eq!(recipe.cooking_time, 30);
    }
}

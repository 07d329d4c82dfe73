// ABOUTME: Catalog seeding utility for the Ladle recipe API
// ABOUTME: Loads the built-in tags and the ingredients.json fixture into the database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Catalog seeder for the Ladle server.
//!
//! Tags and ingredients are static reference data: this binary inserts the
//! built-in tag set and the ingredient fixture file, once. Seeding is
//! forward-only; `--force` wipes and re-seeds the catalog tables.
//!
//! Usage:
//! ```bash
//! # Seed the catalog (uses DATABASE_URL from environment)
//! cargo run --bin seed-catalog
//!
//! # Override database URL and fixture path
//! cargo run --bin seed-catalog -- --database-url sqlite:./data/ladle.db \
//!     --ingredients-file ./fixtures/ingredients.json
//!
//! # Force re-seed
//! cargo run --bin seed-catalog -- --force
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use ladle::database::Database;
use ladle::models::{Ingredient, Tag};
use serde::Deserialize;
use std::env;
use tracing::info;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "seed-catalog",
    about = "Ladle catalog seeder",
    long_about = "Load the built-in tags and the ingredients fixture into the database"
)]
struct SeedArgs {
    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,

    /// Path to the ingredients fixture (JSON array of {name, measurement_unit})
    #[arg(long, default_value = "fixtures/ingredients.json")]
    ingredients_file: String,

    /// Wipe catalog tables and re-seed even if they are populated
    #[arg(long)]
    force: bool,
}

/// Built-in tag definition
struct SeedTag {
    name: &'static str,
    color: &'static str,
    slug: &'static str,
}

/// The default tag set
const SEED_TAGS: &[SeedTag] = &[
    SeedTag {
        name: "Breakfast",
        color: "#fff000",
        slug: "breakfast",
    },
    SeedTag {
        name: "Lunch",
        color: "#fe00ac",
        slug: "lunch",
    },
    SeedTag {
        name: "Dinner",
        color: "#10ff01",
        slug: "dinner",
    },
    SeedTag {
        name: "Healthy",
        color: "#ff00f3",
        slug: "healthy",
    },
    SeedTag {
        name: "Meat",
        color: "#b05c2a",
        slug: "meat",
    },
    SeedTag {
        name: "Vegetables",
        color: "#ff9efa",
        slug: "vegetables",
    },
];

/// One row of the ingredients fixture file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IngredientFixture {
    /// Ingredient name
    pub name: String,
    /// Measurement unit
    pub measurement_unit: String,
}

/// Parse the ingredients fixture, deduplicating while preserving order
///
/// Pure function over the file contents: the caller feeds the returned list
/// straight into the insert step, so no accumulator state outlives the
/// parse.
///
/// # Errors
///
/// Returns an error if the contents are not a JSON array of fixture rows.
pub fn parse_ingredients(contents: &str) -> Result<Vec<IngredientFixture>> {
    let rows: Vec<IngredientFixture> =
        serde_json::from_str(contents).context("ingredients fixture is not valid JSON")?;

    let mut seen = Vec::with_capacity(rows.len());
    for row in rows {
        if !seen.contains(&row) {
            seen.push(row);
        }
    }
    Ok(seen)
}

#[tokio::main]
async fn main() -> Result<()> {
    ladle::logging::init_from_env()?;

    let args = SeedArgs::parse();

    let database_url = args
        .database_url
        .or_else(|| env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite:./data/ladle.db".to_owned());

    let database = Database::new(&database_url).await?;
    let catalog = database.catalog();

    if args.force {
        info!("Force re-seed: clearing catalog tables");
        sqlx::query("DELETE FROM recipe_tags")
            .execute(database.pool())
            .await?;
        sqlx::query("DELETE FROM tags").execute(database.pool()).await?;
        sqlx::query("DELETE FROM ingredients")
            .execute(database.pool())
            .await?;
    }

    // Tags
    let existing_tags = catalog.count_tags().await?;
    if existing_tags > 0 {
        info!("Tags already seeded ({existing_tags} rows), skipping");
    } else {
        for seed in SEED_TAGS {
            let tag = Tag {
                id: Uuid::new_v4(),
                name: seed.name.to_owned(),
                color: seed.color.to_owned(),
                slug: seed.slug.to_owned(),
            };
            catalog.insert_tag(&tag).await?;
        }
        info!("Seeded {} tags", SEED_TAGS.len());
    }

    // Ingredients
    let existing_ingredients = catalog.count_ingredients().await?;
    if existing_ingredients > 0 {
        info!("Ingredients already seeded ({existing_ingredients} rows), skipping");
        return Ok(());
    }

    let contents = tokio::fs::read_to_string(&args.ingredients_file)
        .await
        .with_context(|| format!("failed to read {}", args.ingredients_file))?;
    let fixtures = parse_ingredients(&contents)?;

    for fixture in &fixtures {
        let ingredient = Ingredient {
            id: Uuid::new_v4(),
            name: fixture.name.clone(),
            measurement_unit: fixture.measurement_unit.clone(),
        };
        catalog.insert_ingredient(&ingredient).await?;
    }
    info!("Seeded {} ingredients", fixtures.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deduplicates_preserving_order() {
        let contents = r#"[
            {"name": "salt", "measurement_unit": "g"},
            {"name": "eggs", "measurement_unit": "pcs"},
            {"name": "salt", "measurement_unit": "g"}
        ]"#;

        let parsed = parse_ingredients(contents).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name, "salt");
        assert_eq!(parsed[1].name, "eggs");
    }

    #[test]
    fn test_parse_keeps_same_name_different_unit() {
        let contents = r#"[
            {"name": "milk", "measurement_unit": "ml"},
            {"name": "milk", "measurement_unit": "g"}
        ]"#;

        let parsed = parse_ingredients(contents).unwrap();
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        assert!(parse_ingredients("not json").is_err());
    }
}

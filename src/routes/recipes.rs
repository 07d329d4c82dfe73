// ABOUTME: Route handlers for the recipe collection, membership toggles, and shopping list
// ABOUTME: Read representations expand author, tags, and lines relative to the requesting caller
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Recipe routes
//!
//! Anonymous callers may read; writes require authentication and mutating
//! an existing recipe requires being its author or an admin. Every write
//! returns the same representation as a read.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use axum_extra::extract::Query;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthResult;
use crate::database::memberships::MembershipLookup;
use crate::database::recipes::{
    CreateRecipeRequest, RecipeFilter, RecipeSummary, UpdateRecipeRequest,
};
use crate::database::shopping_list::{render_shopping_list, SHOPPING_LIST_FILENAME};
use crate::errors::AppError;
use crate::models::{IngredientAmount, IngredientLine, Recipe, Tag};
use crate::resources::ServerResources;
use crate::routes::users::{build_user_response, UserResponse};

/// Full recipe read representation
#[derive(Debug, Serialize, Deserialize)]
pub struct RecipeResponse {
    /// Recipe identifier
    pub id: Uuid,
    /// Expanded tag records
    pub tags: Vec<Tag>,
    /// Author summary with `is_subscribed` relative to the caller
    pub author: UserResponse,
    /// Expanded ingredient lines
    pub ingredients: Vec<IngredientAmount>,
    /// Whether the caller has favorited this recipe
    pub is_favorited: bool,
    /// Whether this recipe is in the caller's shopping cart
    pub is_in_shopping_cart: bool,
    /// Recipe name
    pub name: String,
    /// Stored image path
    pub image: String,
    /// Preparation text
    pub text: String,
    /// Cooking time in minutes
    pub cooking_time: i64,
}

/// Response for listing recipes
#[derive(Debug, Serialize, Deserialize)]
pub struct ListRecipesResponse {
    /// Recipes in this page
    pub recipes: Vec<RecipeResponse>,
    /// Total count matching the filter
    pub total: i64,
}

/// One ingredient entry of a recipe write payload
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientEntryBody {
    /// Ingredient id
    pub id: Uuid,
    /// Amount in the ingredient's measurement unit
    pub amount: i64,
}

impl From<IngredientEntryBody> for IngredientLine {
    fn from(body: IngredientEntryBody) -> Self {
        Self {
            ingredient_id: body.id,
            amount: body.amount,
        }
    }
}

/// Request body for creating a recipe
///
/// The author is injected from the authenticated caller, never taken from
/// the payload.
#[derive(Debug, Deserialize)]
pub struct CreateRecipeBody {
    /// Recipe name
    pub name: String,
    /// Base64 image payload (bare or data URL)
    pub image: String,
    /// Preparation text
    pub text: String,
    /// Cooking time in minutes
    pub cooking_time: i64,
    /// Tag ids to associate
    #[serde(default)]
    pub tags: Vec<Uuid>,
    /// Ingredient entries
    #[serde(default)]
    pub ingredients: Vec<IngredientEntryBody>,
}

/// Request body for updating a recipe; omitted fields stay unchanged
#[derive(Debug, Deserialize, Default)]
pub struct UpdateRecipeBody {
    /// New name
    pub name: Option<String>,
    /// New base64 image payload
    pub image: Option<String>,
    /// New preparation text
    pub text: Option<String>,
    /// New cooking time
    pub cooking_time: Option<i64>,
    /// Replacement tag set
    pub tags: Option<Vec<Uuid>>,
    /// Replacement ingredient set
    pub ingredients: Option<Vec<IngredientEntryBody>>,
}

/// Query parameters for listing recipes
///
/// `author` and `tags` are multi-select (repeated keys); the boolean flags
/// accept the widget values `1`/`true` and restrict only when true.
#[derive(Debug, Deserialize, Default)]
pub struct ListRecipesQuery {
    /// Filter by author ids
    #[serde(default)]
    pub author: Vec<Uuid>,
    /// Filter by tag slugs
    #[serde(default)]
    pub tags: Vec<String>,
    /// Restrict to the caller's favorites when true
    pub is_favorited: Option<String>,
    /// Restrict to the caller's shopping cart when true
    pub is_in_shopping_cart: Option<String>,
    /// Maximum results to return
    pub limit: Option<u32>,
    /// Offset for pagination
    pub offset: Option<u32>,
}

/// Interpret a boolean filter widget value; only `1`/`true` restrict
fn flag_is_true(value: Option<&str>) -> bool {
    matches!(value, Some("1" | "true" | "True"))
}

/// Build the full read representation of a recipe relative to the caller
///
/// Anonymous callers get `is_favorited = false` and
/// `is_in_shopping_cart = false` without membership queries.
///
/// # Errors
///
/// Returns an error if any lookup fails.
pub async fn build_recipe_response(
    resources: &Arc<ServerResources>,
    recipe: &Recipe,
    caller: Option<Uuid>,
) -> Result<RecipeResponse, AppError> {
    let recipes_manager = resources.database.recipes();
    let tags = recipes_manager.tags_for(recipe.id).await?;
    let ingredients = recipes_manager.lines_for(recipe.id).await?;

    let author_user = resources
        .database
        .users()
        .get_required(recipe.author_id)
        .await?;
    let author = build_user_response(resources, &author_user, caller).await?;

    let (is_favorited, is_in_shopping_cart) = match caller {
        Some(user_id) => {
            let memberships = resources.database.memberships();
            (
                memberships.exists_favorite(user_id, recipe.id).await?,
                memberships.exists_in_cart(user_id, recipe.id).await?,
            )
        }
        None => (false, false),
    };

    Ok(RecipeResponse {
        id: recipe.id,
        tags,
        author,
        ingredients,
        is_favorited,
        is_in_shopping_cart,
        name: recipe.name.clone(),
        image: recipe.image.clone(),
        text: recipe.text.clone(),
        cooking_time: recipe.cooking_time,
    })
}

/// Recipe routes handler
pub struct RecipesRoutes;

impl RecipesRoutes {
    /// Create all recipe routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/recipes/", get(Self::handle_list))
            .route("/api/recipes/", post(Self::handle_create))
            .route(
                "/api/recipes/download_shopping_cart/",
                get(Self::handle_download_shopping_cart),
            )
            .route("/api/recipes/:id/", get(Self::handle_get))
            .route("/api/recipes/:id/", patch(Self::handle_update))
            .route("/api/recipes/:id/", delete(Self::handle_delete))
            .route("/api/recipes/:id/favorite/", post(Self::handle_add_favorite))
            .route(
                "/api/recipes/:id/favorite/",
                delete(Self::handle_remove_favorite),
            )
            .route(
                "/api/recipes/:id/shopping_cart/",
                post(Self::handle_add_to_cart),
            )
            .route(
                "/api/recipes/:id/shopping_cart/",
                delete(Self::handle_remove_from_cart),
            )
            .with_state(resources)
    }

    /// Fail unless the caller authored the recipe or is an admin
    async fn authorize_mutation(
        resources: &Arc<ServerResources>,
        auth: AuthResult,
        recipe: &Recipe,
    ) -> Result<(), AppError> {
        if recipe.author_id == auth.user_id {
            return Ok(());
        }

        let caller = resources.database.users().get_required(auth.user_id).await?;
        if caller.is_admin {
            return Ok(());
        }

        Err(AppError::permission_denied(
            "Only the author or an admin may modify this recipe",
        ))
    }

    /// Handle GET /api/recipes/ - filtered listing
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListRecipesQuery>,
    ) -> Result<Response, AppError> {
        let caller = resources
            .auth
            .authenticate_optional(&headers)?
            .map(|auth| auth.user_id);

        let wants_favorited = flag_is_true(query.is_favorited.as_deref());
        let wants_in_cart = flag_is_true(query.is_in_shopping_cart.as_deref());

        // An anonymous caller's membership sets are empty, so a true flag
        // matches nothing; false or absent applies no restriction at all
        if (wants_favorited || wants_in_cart) && caller.is_none() {
            return Ok((
                StatusCode::OK,
                Json(ListRecipesResponse {
                    recipes: Vec::new(),
                    total: 0,
                }),
            )
                .into_response());
        }

        let favorited_by = if wants_favorited { caller } else { None };
        let in_cart_of = if wants_in_cart { caller } else { None };

        let filter = RecipeFilter {
            authors: query.author,
            tag_slugs: query.tags,
            favorited_by,
            in_cart_of,
            limit: query.limit,
            offset: query.offset,
        };

        let recipes_manager = resources.database.recipes();
        let recipes = recipes_manager.list(&filter).await?;
        let total = recipes_manager.count(&filter).await?;

        let mut responses = Vec::with_capacity(recipes.len());
        for recipe in &recipes {
            responses.push(build_recipe_response(&resources, recipe, caller).await?);
        }

        Ok((
            StatusCode::OK,
            Json(ListRecipesResponse {
                recipes: responses,
                total,
            }),
        )
            .into_response())
    }

    /// Handle POST /api/recipes/ - create a recipe
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateRecipeBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;

        let image = resources.image_store.store_base64(&body.image).await?;

        let request = CreateRecipeRequest {
            name: body.name,
            image,
            text: body.text,
            cooking_time: body.cooking_time,
            tags: body.tags,
            ingredients: body.ingredients.into_iter().map(Into::into).collect(),
        };

        let recipe = resources
            .database
            .recipes()
            .create(auth.user_id, &request)
            .await?;

        let response = build_recipe_response(&resources, &recipe, Some(auth.user_id)).await?;
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/recipes/:id/ - read a recipe
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = resources
            .auth
            .authenticate_optional(&headers)?
            .map(|auth| auth.user_id);

        let recipe = resources.database.recipes().get_required(id).await?;

        let response = build_recipe_response(&resources, &recipe, caller).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PATCH /api/recipes/:id/ - update a recipe
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Json(body): Json<UpdateRecipeBody>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;

        let recipes_manager = resources.database.recipes();
        let existing = recipes_manager.get_required(id).await?;
        Self::authorize_mutation(&resources, auth, &existing).await?;

        let image = match body.image {
            Some(payload) => Some(resources.image_store.store_base64(&payload).await?),
            None => None,
        };

        let request = UpdateRecipeRequest {
            name: body.name,
            image,
            text: body.text,
            cooking_time: body.cooking_time,
            tags: body.tags,
            ingredients: body
                .ingredients
                .map(|entries| entries.into_iter().map(Into::into).collect()),
        };

        let recipe = recipes_manager.update(id, &request).await?;

        let response = build_recipe_response(&resources, &recipe, Some(auth.user_id)).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /api/recipes/:id/ - delete a recipe
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;

        let recipes_manager = resources.database.recipes();
        let existing = recipes_manager.get_required(id).await?;
        Self::authorize_mutation(&resources, auth, &existing).await?;

        recipes_manager.delete(id).await?;

        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Handle POST /api/recipes/:id/favorite/ - add to favorites
    async fn handle_add_favorite(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let recipe = resources.database.recipes().get_required(id).await?;

        resources
            .database
            .memberships()
            .add_favorite(auth.user_id, recipe.id)
            .await?;

        Ok((StatusCode::CREATED, Json(summary_of(&recipe))).into_response())
    }

    /// Handle DELETE /api/recipes/:id/favorite/ - remove from favorites
    async fn handle_remove_favorite(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let recipe = resources.database.recipes().get_required(id).await?;

        resources
            .database
            .memberships()
            .remove_favorite(auth.user_id, recipe.id)
            .await?;

        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Handle POST /api/recipes/:id/shopping_cart/ - add to cart
    async fn handle_add_to_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let recipe = resources.database.recipes().get_required(id).await?;

        resources
            .database
            .memberships()
            .add_to_cart(auth.user_id, recipe.id)
            .await?;

        Ok((StatusCode::CREATED, Json(summary_of(&recipe))).into_response())
    }

    /// Handle DELETE /api/recipes/:id/shopping_cart/ - remove from cart
    async fn handle_remove_from_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let recipe = resources.database.recipes().get_required(id).await?;

        resources
            .database
            .memberships()
            .remove_from_cart(auth.user_id, recipe.id)
            .await?;

        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Handle GET /api/recipes/download_shopping_cart/ - the aggregated list
    async fn handle_download_shopping_cart(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;

        let lines = resources
            .database
            .shopping_list()
            .aggregate(auth.user_id)
            .await?;
        let document = render_shopping_list(&lines);

        Ok((
            StatusCode::OK,
            [
                (
                    header::CONTENT_TYPE,
                    "text/plain; charset=utf-8".to_owned(),
                ),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={SHOPPING_LIST_FILENAME}"),
                ),
            ],
            document,
        )
            .into_response())
    }
}

fn summary_of(recipe: &Recipe) -> RecipeSummary {
    RecipeSummary {
        id: recipe.id,
        name: recipe.name.clone(),
        image: recipe.image.clone(),
        cooking_time: recipe.cooking_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_widget_values() {
        assert!(flag_is_true(Some("1")));
        assert!(flag_is_true(Some("true")));
        assert!(flag_is_true(Some("True")));
        assert!(!flag_is_true(Some("0")));
        assert!(!flag_is_true(Some("false")));
        assert!(!flag_is_true(None));
    }
}

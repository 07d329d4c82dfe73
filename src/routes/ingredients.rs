// ABOUTME: Route handlers for the read-only ingredient catalog
// ABOUTME: Case-insensitive substring search on name, no auth required
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Ingredient catalog routes

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::resources::ServerResources;

/// Query parameters for listing ingredients
#[derive(Debug, Deserialize, Default)]
pub struct ListIngredientsQuery {
    /// Case-insensitive substring to match against ingredient names
    pub name: Option<String>,
}

/// Ingredient routes handler
pub struct IngredientsRoutes;

impl IngredientsRoutes {
    /// Create all ingredient routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/ingredients/", get(Self::handle_list))
            .route("/api/ingredients/:id/", get(Self::handle_get))
            .with_state(resources)
    }

    /// Handle GET /api/ingredients/ - search the catalog, unpaginated
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<ListIngredientsQuery>,
    ) -> Result<Response, AppError> {
        let ingredients = resources
            .database
            .catalog()
            .search_ingredients(query.name.as_deref())
            .await?;

        Ok((StatusCode::OK, Json(ingredients)).into_response())
    }

    /// Handle GET /api/ingredients/:id/ - get a single ingredient
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let ingredient = resources
            .database
            .catalog()
            .get_ingredient(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Ingredient {id}")))?;

        Ok((StatusCode::OK, Json(ingredient)).into_response())
    }
}

// ABOUTME: Route module organization for Ladle HTTP endpoints
// ABOUTME: One module per resource, merged into the application router with shared layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Route modules for the Ladle server
//!
//! Each resource module exposes a `routes(Arc<ServerResources>)` constructor
//! returning its own `Router`; [`router`] merges them and applies the shared
//! CORS and tracing layers.

use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::resources::ServerResources;

/// Health check and readiness routes
pub mod health;
/// Ingredient catalog routes
pub mod ingredients;
/// Recipe collection, membership toggles, and shopping-list download
pub mod recipes;
/// Tag catalog routes
pub mod tags;
/// User profiles, registration, and subscriptions
pub mod users;

pub use health::HealthRoutes;
pub use ingredients::IngredientsRoutes;
pub use recipes::RecipesRoutes;
pub use tags::TagsRoutes;
pub use users::UsersRoutes;

/// Build the full application router
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(TagsRoutes::routes(resources.clone()))
        .merge(IngredientsRoutes::routes(resources.clone()))
        .merge(RecipesRoutes::routes(resources.clone()))
        .merge(UsersRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// ABOUTME: Route handlers for the read-only tag catalog
// ABOUTME: Unpaginated listing and single-tag lookup, no auth required
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Tag catalog routes

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::resources::ServerResources;

/// Tag routes handler
pub struct TagsRoutes;

impl TagsRoutes {
    /// Create all tag routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/tags/", get(Self::handle_list))
            .route("/api/tags/:id/", get(Self::handle_get))
            .with_state(resources)
    }

    /// Handle GET /api/tags/ - list all tags, unpaginated
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let tags = resources.database.catalog().list_tags().await?;
        Ok((StatusCode::OK, Json(tags)).into_response())
    }

    /// Handle GET /api/tags/:id/ - get a single tag
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let tag = resources
            .database
            .catalog()
            .get_tag(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Tag {id}")))?;

        Ok((StatusCode::OK, Json(tag)).into_response())
    }
}

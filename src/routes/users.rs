// ABOUTME: Route handlers for user profiles, registration, and author subscriptions
// ABOUTME: Profile reads compute is_subscribed relative to the requesting caller
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! User routes
//!
//! Registration creates the account record only; credentials live with the
//! external identity service. Profile representations carry an
//! `is_subscribed` flag relative to the caller, false for anonymous reads.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::memberships::is_subscribed;
use crate::database::recipes::RecipeSummary;
use crate::errors::AppError;
use crate::models::User;
use crate::resources::ServerResources;

/// User profile representation
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    /// User identifier
    pub id: Uuid,
    /// Email address
    pub email: String,
    /// Username
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Whether the requesting caller follows this user
    pub is_subscribed: bool,
}

/// Subscription representation: the followed author plus their recipes
#[derive(Debug, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    /// Author identifier
    pub id: Uuid,
    /// Author email
    pub email: String,
    /// Author username
    pub username: String,
    /// Author given name
    pub first_name: String,
    /// Author family name
    pub last_name: String,
    /// Always true for the subscriber's own listing
    pub is_subscribed: bool,
    /// The author's recipes, newest first, optionally limited
    pub recipes: Vec<RecipeSummary>,
    /// Total number of recipes the author owns
    pub recipes_count: i64,
}

/// Request body for registering a user
#[derive(Debug, Deserialize)]
pub struct CreateUserBody {
    /// Email address, unique
    pub email: String,
    /// Username, unique
    pub username: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
}

/// Query parameters for listing users
#[derive(Debug, Deserialize, Default)]
pub struct ListUsersQuery {
    /// Maximum results to return
    pub limit: Option<u32>,
    /// Offset for pagination
    pub offset: Option<u32>,
}

/// Response for listing users
#[derive(Debug, Serialize, Deserialize)]
pub struct ListUsersResponse {
    /// Users in this page
    pub users: Vec<UserResponse>,
    /// Total user count
    pub total: i64,
}

/// Query parameters for the subscriptions listing
#[derive(Debug, Deserialize, Default)]
pub struct SubscriptionsQuery {
    /// Maximum results to return
    pub limit: Option<u32>,
    /// Offset for pagination
    pub offset: Option<u32>,
    /// Cap on recipes embedded per author
    pub recipes_limit: Option<u32>,
}

/// Response for the subscriptions listing
#[derive(Debug, Serialize, Deserialize)]
pub struct ListSubscriptionsResponse {
    /// Followed authors with their recipes
    pub subscriptions: Vec<SubscriptionResponse>,
    /// Total number of subscriptions
    pub total: i64,
}

/// Build a user profile representation relative to the caller
///
/// # Errors
///
/// Returns an error if the membership lookup fails.
pub async fn build_user_response(
    resources: &Arc<ServerResources>,
    user: &User,
    caller: Option<Uuid>,
) -> Result<UserResponse, AppError> {
    let subscribed = is_subscribed(&resources.database.memberships(), caller, user.id).await?;

    Ok(UserResponse {
        id: user.id,
        email: user.email.clone(),
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        is_subscribed: subscribed,
    })
}

/// Build the subscription representation for a followed author
async fn build_subscription_response(
    resources: &Arc<ServerResources>,
    author: &User,
    caller: Uuid,
    recipes_limit: Option<u32>,
) -> Result<SubscriptionResponse, AppError> {
    let recipes_manager = resources.database.recipes();
    let recipes = recipes_manager
        .summaries_by_author(author.id, recipes_limit)
        .await?;
    let recipes_count = recipes_manager.count_by_author(author.id).await?;
    let subscribed =
        is_subscribed(&resources.database.memberships(), Some(caller), author.id).await?;

    Ok(SubscriptionResponse {
        id: author.id,
        email: author.email.clone(),
        username: author.username.clone(),
        first_name: author.first_name.clone(),
        last_name: author.last_name.clone(),
        is_subscribed: subscribed,
        recipes,
        recipes_count,
    })
}

/// User routes handler
pub struct UsersRoutes;

impl UsersRoutes {
    /// Create all user routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/users/", post(Self::handle_create))
            .route("/api/users/", get(Self::handle_list))
            .route("/api/users/me/", get(Self::handle_me))
            .route("/api/users/subscriptions/", get(Self::handle_subscriptions))
            .route("/api/users/:id/", get(Self::handle_get))
            .route("/api/users/:id/subscribe/", post(Self::handle_subscribe))
            .route("/api/users/:id/subscribe/", delete(Self::handle_unsubscribe))
            .with_state(resources)
    }

    /// Handle POST /api/users/ - register a user record
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<CreateUserBody>,
    ) -> Result<Response, AppError> {
        if body.email.trim().is_empty() {
            return Err(AppError::validation("email", "Email must not be empty"));
        }
        if body.username.trim().is_empty() {
            return Err(AppError::validation("username", "Username must not be empty"));
        }

        let user = User::new(body.email, body.username, body.first_name, body.last_name);
        resources.database.users().create(&user).await?;

        let response = build_user_response(&resources, &user, None).await?;
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/users/ - list users
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListUsersQuery>,
    ) -> Result<Response, AppError> {
        let caller = resources
            .auth
            .authenticate_optional(&headers)?
            .map(|auth| auth.user_id);

        let users_manager = resources.database.users();
        let users = users_manager
            .list(query.limit.unwrap_or(50), query.offset.unwrap_or(0))
            .await?;
        let total = users_manager.count().await?;

        let mut responses = Vec::with_capacity(users.len());
        for user in &users {
            responses.push(build_user_response(&resources, user, caller).await?);
        }

        Ok((
            StatusCode::OK,
            Json(ListUsersResponse {
                users: responses,
                total,
            }),
        )
            .into_response())
    }

    /// Handle GET /api/users/me/ - the caller's own profile
    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let user = resources.database.users().get_required(auth.user_id).await?;

        let response = build_user_response(&resources, &user, Some(auth.user_id)).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/users/:id/ - a user profile
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let caller = resources
            .auth
            .authenticate_optional(&headers)?
            .map(|auth| auth.user_id);

        let user = resources.database.users().get_required(id).await?;

        let response = build_user_response(&resources, &user, caller).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/users/:id/subscribe/ - follow an author
    async fn handle_subscribe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Query(query): Query<SubscriptionsQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let author = resources.database.users().get_required(id).await?;

        resources
            .database
            .memberships()
            .add_follow(auth.user_id, author.id)
            .await?;

        let response =
            build_subscription_response(&resources, &author, auth.user_id, query.recipes_limit)
                .await?;
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle DELETE /api/users/:id/subscribe/ - unfollow an author
    async fn handle_unsubscribe(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;
        let author = resources.database.users().get_required(id).await?;

        resources
            .database
            .memberships()
            .remove_follow(auth.user_id, author.id)
            .await?;

        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Handle GET /api/users/subscriptions/ - the caller's subscriptions
    async fn handle_subscriptions(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<SubscriptionsQuery>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth.authenticate(&headers)?;

        let memberships = resources.database.memberships();
        let author_ids = memberships
            .list_followed_authors(
                auth.user_id,
                query.limit.unwrap_or(50),
                query.offset.unwrap_or(0),
            )
            .await?;
        let total = memberships.count_follows(auth.user_id).await?;

        let users_manager = resources.database.users();
        let mut subscriptions = Vec::with_capacity(author_ids.len());
        for author_id in author_ids {
            let author = users_manager.get_required(author_id).await?;
            subscriptions.push(
                build_subscription_response(
                    &resources,
                    &author,
                    auth.user_id,
                    query.recipes_limit,
                )
                .await?,
            );
        }

        Ok((
            StatusCode::OK,
            Json(ListSubscriptionsResponse {
                subscriptions,
                total,
            }),
        )
            .into_response())
    }
}

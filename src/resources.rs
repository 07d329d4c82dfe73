// ABOUTME: Shared server resources passed to every route group as axum state
// ABOUTME: Bundles database, auth manager, image store, and configuration behind one Arc
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Centralized server resources
//!
//! One [`ServerResources`] is built at startup and shared by reference with
//! every route group, instead of threading individual handles through each
//! constructor.

use std::sync::Arc;

use crate::auth::AuthManager;
use crate::config::environment::ServerConfig;
use crate::database::Database;
use crate::media::ImageStore;

/// Shared resources for all route handlers
pub struct ServerResources {
    /// Database manager
    pub database: Database,
    /// Bearer token validator
    pub auth: AuthManager,
    /// Image asset storage
    pub image_store: Arc<dyn ImageStore>,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Create a new resource bundle
    #[must_use]
    pub fn new(
        database: Database,
        auth: AuthManager,
        image_store: Arc<dyn ImageStore>,
        config: Arc<ServerConfig>,
    ) -> Self {
        Self {
            database,
            auth,
            image_store,
            config,
        }
    }
}

// ABOUTME: Main library entry point for the Ladle recipe API
// ABOUTME: Recipe sharing with tags, favorites, shopping cart aggregation, and subscriptions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![deny(unsafe_code)]

//! # Ladle
//!
//! A recipe-sharing REST API. Users create recipes with tags and ingredient
//! quantities, favorite recipes, subscribe to authors, and download a
//! shopping list that aggregates ingredient amounts across their cart.
//!
//! ## Architecture
//!
//! - **Models**: persistent domain shapes (users, catalog, recipes)
//! - **Database**: `SQLite` via `sqlx`, one manager per domain, transactional
//!   recipe writes, membership uniqueness enforced by the schema
//! - **Routes**: axum route groups per resource sharing one
//!   [`resources::ServerResources`]
//! - **Auth**: bearer token validation only; issuance is delegated to the
//!   external identity service
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ladle::config::environment::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Ladle configured for port {}", config.http_port);
//!     Ok(())
//! }
//! ```

// ── Public API ──────────────────────────────────────────────────────────
// These modules are used by the binary crates (src/bin/) and integration
// tests (tests/). They must remain `pub` so external consumers can access
// them.

/// Bearer token validation and caller resolution
pub mod auth;

/// Environment-driven configuration
pub mod config;

/// Database pool, schema, and per-domain managers
pub mod database;

/// Unified error handling
pub mod errors;

/// Logging configuration
pub mod logging;

/// Image asset storage
pub mod media;

/// Core data models
pub mod models;

/// Shared server resources
pub mod resources;

/// HTTP route groups
pub mod routes;

/// Test data helpers
pub mod test_utils;

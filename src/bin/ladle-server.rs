// ABOUTME: Main server binary for the Ladle recipe API
// ABOUTME: Loads configuration, migrates the database, and serves the HTTP API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Ladle Server Binary
//!
//! Starts the recipe-sharing REST API: catalog, recipes, memberships,
//! shopping-list download, and subscriptions.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use ladle::{
    auth::AuthManager,
    config::environment::ServerConfig,
    database::Database,
    logging,
    media::LocalImageStore,
    resources::ServerResources,
    routes,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "ladle-server")]
#[command(about = "Ladle - Recipe sharing REST API")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration from environment
    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    // Initialize production logging
    logging::init_from_env()?;

    info!("Starting Ladle recipe API");
    info!("{}", config.summary());

    // Initialize database (runs migrations)
    let database = Database::new(&config.database_url).await?;
    info!("Database initialized successfully");

    let auth = AuthManager::new(&config.jwt_secret);
    let image_store = Arc::new(LocalImageStore::new(config.media_dir.clone()));

    let config = Arc::new(config);
    let resources = Arc::new(ServerResources::new(
        database,
        auth,
        image_store,
        config.clone(),
    ));

    let app = routes::router(resources);

    let listener =
        tokio::net::TcpListener::bind(("0.0.0.0", config.http_port)).await?;
    info!("HTTP server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

// ABOUTME: HTTP server assembly for the catalog API
// ABOUTME: Merges every route group, applies tracing and CORS layers, and serves until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Catalog HTTP Server
//!
//! [`build_router`] produces the complete application used both by the
//! server binary and by the integration tests.

use crate::middleware::setup_cors;
use crate::resources::ServerResources;
use crate::routes::{
    CategoriesRoutes, EventsRoutes, HealthRoutes, ImagesRoutes, IngredientsRoutes,
    ProductsRoutes, SuppliersRoutes,
};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Build the application router with all routes and layers
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let cors = setup_cors(&resources.config);

    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(&resources)))
        .merge(CategoriesRoutes::routes(Arc::clone(&resources)))
        .merge(SuppliersRoutes::routes(Arc::clone(&resources)))
        .merge(IngredientsRoutes::routes(Arc::clone(&resources)))
        .merge(ProductsRoutes::routes(Arc::clone(&resources)))
        .merge(ImagesRoutes::routes(Arc::clone(&resources)))
        .merge(EventsRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Serve the catalog API until Ctrl+C
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails
pub async fn run(resources: Arc<ServerResources>) -> Result<()> {
    let address = format!(
        "{}:{}",
        resources.config.host, resources.config.http_port
    );
    let listener = TcpListener::bind(&address).await?;
    info!("Catalog API listening on http://{address}");

    let app = build_router(resources);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Catalog API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        return;
    }
    info!("Shutdown signal received");
}

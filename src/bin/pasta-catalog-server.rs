// ABOUTME: Server binary for the pasta catalog REST API
// ABOUTME: Loads configuration, connects storage, and serves the catalog over HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Pasta Catalog Server Binary
//!
//! Configuration comes from the environment; see
//! [`ServerConfig::from_env`](pasta_catalog::config::environment::ServerConfig::from_env).

use anyhow::Result;
use clap::Parser;
use pasta_catalog::{
    config::environment::ServerConfig, database::Database, logging, resources::ServerResources,
    server,
};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "pasta-catalog-server")]
#[command(about = "Pasta catalog API - products, ingredients and dietary profiles")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override the upload directory for product images
    #[arg(long)]
    upload_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(upload_dir) = args.upload_dir {
        config.images.upload_dir = upload_dir.into();
    }

    logging::init_from_env()?;

    info!("Starting pasta catalog API");
    info!("{}", config.summary());

    let database = Database::connect(&config.database.url).await?;
    info!("Database ready: {}", config.database.url);

    let resources = Arc::new(ServerResources::new(
        Arc::new(database),
        Arc::new(config),
    ));
    resources.images.ensure_dir().await?;

    display_available_endpoints(&resources.config);

    if let Err(e) = server::run(resources).await {
        error!("Server error: {e}");
        return Err(e);
    }
    Ok(())
}

#[allow(clippy::cognitive_complexity)]
fn display_available_endpoints(config: &ServerConfig) {
    let base = format!("http://{}:{}", config.host, config.http_port);
    info!("=== Available API Endpoints ===");
    info!("   Health:        GET  {base}/health, {base}/ready");
    info!("   Products:      GET  {base}/api/products[?view=full]");
    info!("   Ingredients:   GET  {base}/api/ingredients");
    info!("   Allergens:     GET  {base}/api/allergens");
    info!("   Categories:    GET  {base}/api/categories");
    info!("   Suppliers:     GET  {base}/api/suppliers");
    info!("   Images:        POST {base}/api/images");
    info!("   Events (SSE):  GET  {base}/api/events");
    info!("=== End of Endpoint List ===");
}

// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory databases, server resources, routers, and catalog fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]
//! Shared test utilities for `pasta_catalog`

use anyhow::Result;
use axum::Router;
use pasta_catalog::{
    config::environment::ServerConfig,
    database::{Database, IngredientInput, ProductInput},
    models::{normalize_allergens, Ingredient, IngredientKind, Product},
    resources::ServerResources,
    server::build_router,
};
use std::env;
use std::sync::{Arc, Once};
use tempfile::TempDir;
use tracing::Level;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard in-memory test database
pub async fn create_test_database() -> Result<Arc<Database>> {
    init_test_logging();
    let database = Database::new("sqlite::memory:").await?;
    Ok(Arc::new(database))
}

/// Test server wired to an in-memory database and a temporary upload directory
pub struct TestServer {
    /// Shared resources, for direct database access and event subscription
    pub resources: Arc<ServerResources>,
    /// Keeps the upload directory alive for the test's duration
    pub upload_dir: TempDir,
}

impl TestServer {
    /// Server with default configuration
    pub async fn new() -> Result<Self> {
        Self::with_config(|_| {}).await
    }

    /// Server with configuration adjusted by `configure`
    pub async fn with_config(configure: impl FnOnce(&mut ServerConfig)) -> Result<Self> {
        let database = create_test_database().await?;
        let upload_dir = TempDir::new()?;

        let mut config = ServerConfig::default();
        config.images.upload_dir = upload_dir.path().to_path_buf();
        configure(&mut config);

        let resources = Arc::new(ServerResources::new(database, Arc::new(config)));
        Ok(Self {
            resources,
            upload_dir,
        })
    }

    /// Fresh router sharing this server's resources
    pub fn router(&self) -> Router {
        build_router(Arc::clone(&self.resources))
    }

    /// Catalog database
    pub fn database(&self) -> &Database {
        &self.resources.database
    }
}

/// Insert a leaf ingredient
pub async fn create_simple_ingredient(
    database: &Database,
    name: &str,
    allergens: &[&str],
    vegan: bool,
    vegetarian: bool,
) -> Result<Ingredient> {
    let input = IngredientInput {
        name: name.to_owned(),
        kind: IngredientKind::Simple,
        sub_ingredient_ids: Vec::new(),
        allergens: normalize_allergens(allergens.iter().copied()),
        vegan,
        vegetarian,
        supplier_id: None,
    };
    Ok(database.ingredients().create(&input).await?)
}

/// Insert a composite ingredient with its own declared flags
pub async fn create_composite_ingredient(
    database: &Database,
    name: &str,
    sub_ingredient_ids: &[Uuid],
    allergens: &[&str],
    vegan: bool,
    vegetarian: bool,
) -> Result<Ingredient> {
    let input = IngredientInput {
        name: name.to_owned(),
        kind: IngredientKind::Compose,
        sub_ingredient_ids: sub_ingredient_ids.to_vec(),
        allergens: normalize_allergens(allergens.iter().copied()),
        vegan,
        vegetarian,
        supplier_id: None,
    };
    Ok(database.ingredients().create(&input).await?)
}

/// Insert a product with the given composition
pub async fn create_product(
    database: &Database,
    name: &str,
    composition: &[Uuid],
) -> Result<Product> {
    let input = ProductInput {
        name: name.to_owned(),
        category_id: None,
        description: None,
        price: 9.9,
        stock: 3,
        composition: composition.to_vec(),
        image: None,
    };
    Ok(database.products().create(&input).await?)
}

/// The "Lasagnes fraîches" fixture: egg pasta and tomatoes
pub async fn create_lasagnes(database: &Database) -> Result<Product> {
    let pates = create_simple_ingredient(
        database,
        "PâtesAuxŒufs",
        &["gluten", "œufs"],
        false,
        true,
    )
    .await?;
    let tomates = create_simple_ingredient(database, "Tomates", &[], true, true).await?;
    create_product(database, "Lasagnes fraîches", &[pates.id, tomates.id]).await
}

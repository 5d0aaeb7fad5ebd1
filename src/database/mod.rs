// ABOUTME: SQLite document store for the catalog with per-collection managers
// ABOUTME: Handles connection setup, schema migration, and shared row decoding helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Catalog Database
//!
//! One table per collection. Array fields (ingredient sub-ingredients and
//! allergens, product composition) are stored as JSON documents and decoded
//! leniently: entries that cannot be parsed are dropped with a warning
//! instead of failing the whole read.

/// Category collection
pub mod categories;
/// Ingredient collection
pub mod ingredients;
/// Product collection
pub mod products;
/// Supplier collection
pub mod suppliers;

pub use categories::{CategoriesManager, CategoryInput};
pub use ingredients::{IngredientFilter, IngredientInput, IngredientsManager};
pub use products::{CategoryFilter, ProductFilter, ProductInput, ProductsManager};
pub use suppliers::{SupplierInput, SuppliersManager};

use crate::config::database::DatabaseUrl;
use crate::errors::{AppError, AppResult};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use serde_json::Value;
use sqlx::SqlitePool;
use std::str::FromStr;
use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;

const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS categories (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS suppliers (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        contact TEXT,
        email TEXT,
        phone TEXT,
        address TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS ingredients (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        kind TEXT NOT NULL DEFAULT 'simple',
        sub_ingredients TEXT NOT NULL DEFAULT '[]',
        allergens TEXT NOT NULL DEFAULT '[]',
        vegan INTEGER NOT NULL DEFAULT 0,
        vegeta INTEGER NOT NULL DEFAULT 0,
        supplier_id TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS products (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        category_id TEXT,
        description TEXT,
        price REAL NOT NULL DEFAULT 0,
        stock INTEGER NOT NULL DEFAULT 0,
        composition TEXT NOT NULL DEFAULT '[]',
        image TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_products_category ON products(category_id)",
    "CREATE INDEX IF NOT EXISTS idx_ingredients_supplier ON ingredients(supplier_id)",
];

/// Catalog database handle
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the connection fails or the
    /// schema cannot be created
    pub async fn new(database_url: &str) -> AppResult<Self> {
        let url = DatabaseUrl::parse_url(database_url)?;
        Self::connect(&url).await
    }

    /// Connect using a parsed database location and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or the schema cannot be created
    pub async fn connect(url: &DatabaseUrl) -> AppResult<Self> {
        if let DatabaseUrl::SQLite { path } = url {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::database(format!(
                        "Failed to create database directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let options = SqliteConnectOptions::from_str(&url.to_connection_string())
            .map_err(|e| AppError::database(format!("Invalid database URL {url}: {e}")))?
            .create_if_missing(true);

        // Every connection to :memory: opens a distinct database
        let max_connections = if url.is_memory() { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to connect to {url}: {e}")))?;

        let database = Self { pool };
        database.migrate().await?;
        info!(database.url = %url, "Catalog database ready");
        Ok(database)
    }

    /// Create tables and indexes if they do not exist
    ///
    /// # Errors
    ///
    /// Returns an error if a schema statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to migrate schema: {e}")))?;
        }
        Ok(())
    }

    /// Check that the database answers queries
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Database ping failed: {e}")))?;
        Ok(())
    }

    /// Underlying connection pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Category collection manager
    #[must_use]
    pub fn categories(&self) -> CategoriesManager {
        CategoriesManager::new(self.pool.clone())
    }

    /// Supplier collection manager
    #[must_use]
    pub fn suppliers(&self) -> SuppliersManager {
        SuppliersManager::new(self.pool.clone())
    }

    /// Ingredient collection manager
    #[must_use]
    pub fn ingredients(&self) -> IngredientsManager {
        IngredientsManager::new(self.pool.clone())
    }

    /// Product collection manager
    #[must_use]
    pub fn products(&self) -> ProductsManager {
        ProductsManager::new(self.pool.clone())
    }
}

/// Decode a stored identifier
pub(crate) fn parse_stored_uuid(value: &str) -> AppResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| AppError::internal(format!("Invalid stored UUID '{value}': {e}")))
}

/// Decode an optional stored reference, dropping unparseable values
pub(crate) fn parse_stored_reference(value: Option<String>, field: &str) -> Option<Uuid> {
    let value = value?;
    match Uuid::parse_str(&value) {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(field, value = %value, "Ignoring malformed stored reference: {e}");
            None
        }
    }
}

/// Decode a stored RFC 3339 timestamp
pub(crate) fn parse_stored_timestamp(value: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::internal(format!("Invalid stored datetime '{value}': {e}")))
}

/// Decode a JSON array of identifiers, keeping order and dropping bad entries
pub(crate) fn parse_stored_id_list(document: &str, field: &str) -> Vec<Uuid> {
    let Ok(Value::Array(items)) = serde_json::from_str::<Value>(document) else {
        warn!(field, "Ignoring malformed stored id list");
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let parsed = item.as_str().and_then(|s| Uuid::parse_str(s).ok());
            if parsed.is_none() {
                warn!(field, entry = %item, "Ignoring malformed stored id");
            }
            parsed
        })
        .collect()
}

/// Unicode lowercase form of a name, used for uniqueness checks and search
///
/// `SQLite`'s `NOCASE` collation and `lower()` fold ASCII letters only, so
/// "Œufs" and "œufs" compare equal here but not in SQL.
pub(crate) fn fold_name(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Whether `name` contains `query` after case folding
pub(crate) fn name_matches(name: &str, query: &str) -> bool {
    fold_name(name).contains(&fold_name(query))
}

/// Whether a row of `table` other than `exclude` already uses `name`
pub(crate) async fn name_taken(
    pool: &SqlitePool,
    table: &str,
    name: &str,
    exclude: Option<Uuid>,
) -> AppResult<bool> {
    let names: Vec<String> = sqlx::query_scalar(&format!(
        "SELECT name FROM {table} WHERE ($1 IS NULL OR id != $1)"
    ))
    .bind(exclude.map(|id| id.to_string()))
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database(format!("Failed to check {table} names: {e}")))?;

    let folded = fold_name(name);
    Ok(names.iter().any(|existing| fold_name(existing) == folded))
}

/// Encode a list of identifiers as a JSON document
pub(crate) fn encode_id_list(ids: &[Uuid]) -> AppResult<String> {
    Ok(serde_json::to_string(ids)?)
}

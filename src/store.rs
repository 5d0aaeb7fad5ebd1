// ABOUTME: Read-side store interface used by composition expansion and product views
// ABOUTME: Implemented by the SQLite database and by in-memory stores in tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::database::{Database, ProductFilter};
use crate::errors::AppResult;
use crate::models::{Ingredient, Product};
use async_trait::async_trait;
use uuid::Uuid;

/// Lookups the dietary layer needs from the document store
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetch every ingredient whose ID is in `ids`; unknown IDs are skipped
    async fn get_ingredients(&self, ids: &[Uuid]) -> AppResult<Vec<Ingredient>>;

    /// Fetch one ingredient
    async fn get_ingredient(&self, id: Uuid) -> AppResult<Option<Ingredient>> {
        Ok(self.get_ingredients(&[id]).await?.into_iter().next())
    }

    /// Fetch one product
    async fn get_product(&self, id: Uuid) -> AppResult<Option<Product>>;

    /// List products matching `filter`
    async fn list_products(&self, filter: &ProductFilter) -> AppResult<Vec<Product>>;
}

#[async_trait]
impl CatalogStore for Database {
    async fn get_ingredients(&self, ids: &[Uuid]) -> AppResult<Vec<Ingredient>> {
        self.ingredients().get_many(ids).await
    }

    async fn get_ingredient(&self, id: Uuid) -> AppResult<Option<Ingredient>> {
        self.ingredients().get(id).await
    }

    async fn get_product(&self, id: Uuid) -> AppResult<Option<Product>> {
        self.products().get(id).await
    }

    async fn list_products(&self, filter: &ProductFilter) -> AppResult<Vec<Product>> {
        self.products().list(filter).await
    }
}

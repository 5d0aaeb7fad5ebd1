// ABOUTME: Route handlers for the product REST API
// ABOUTME: Resolves compositions on every read and derives dietary flags on full views
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Product routes
//!
//! Every product response carries its resolved composition. With
//! `?view=full` the derived `allergens`, `vegan` and `vegeta` fields are
//! added at the top level of each product.

use super::ingredients::join_ids;
use super::{optional_text, parse_id, parse_id_list, parse_optional_id, required_name, ListMetadata};
use crate::constants::labels;
use crate::database::{CategoryFilter, ProductFilter, ProductInput};
use crate::dietary::{CompositionView, CompositionViewBuilder, DietaryProfile, ResolvedIngredient};
use crate::errors::{AppError, AppResult};
use crate::events::{CatalogAction, CatalogCollection};
use crate::images::ImageStore;
use crate::models::Product;
use crate::resources::ServerResources;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Product as returned by the API
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Category reference
    pub category_id: Option<String>,
    /// Category name, or the "uncategorized" label
    pub category_label: String,
    /// Optional description
    pub description: Option<String>,
    /// Unit price
    pub price: f64,
    /// Units in stock
    pub stock: u32,
    /// Stored image file name
    pub image: Option<String>,
    /// URL serving the image
    pub image_url: Option<String>,
    /// Resolved composition; dangling references are `null`
    pub composition: Vec<Option<ResolvedIngredient>>,
    /// Derived profile, only on full views
    #[serde(flatten)]
    pub dietary: Option<DietaryProfile>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl ProductResponse {
    fn new(product: Product, view: CompositionView, category_name: Option<String>) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name,
            category_id: product.category_id.map(|id| id.to_string()),
            category_label: category_name.unwrap_or_else(|| labels::UNCATEGORIZED.to_owned()),
            description: product.description,
            price: product.price,
            stock: product.stock,
            image_url: product.image.as_deref().map(|name| format!("/api/images/{name}")),
            image: product.image,
            composition: view.composition,
            dietary: view.dietary,
            created_at: product.created_at.to_rfc3339(),
            updated_at: product.updated_at.to_rfc3339(),
        }
    }
}

/// Response for listing products
#[derive(Debug, Serialize)]
pub struct ListProductsResponse {
    /// Products ordered by name
    pub products: Vec<ProductResponse>,
    /// Number of products
    pub total: usize,
    /// Metadata
    pub metadata: ListMetadata,
}

/// Query parameters selecting the product view
#[derive(Debug, Deserialize, Default)]
pub struct ViewQuery {
    /// `full` adds the dietary profile
    pub view: Option<String>,
}

impl ViewQuery {
    fn is_full(&self) -> bool {
        is_full_view(self.view.as_deref())
    }
}

fn is_full_view(view: Option<&str>) -> bool {
    view.is_some_and(|view| view.trim().eq_ignore_ascii_case("full"))
}

/// Query parameters for listing products
#[derive(Debug, Deserialize, Default)]
pub struct ListProductsQuery {
    /// `full` adds the dietary profile
    pub view: Option<String>,
    /// Category ID, or `none` for uncategorized products
    pub category: Option<String>,
    /// Name substring
    pub q: Option<String>,
}

impl ListProductsQuery {
    fn filter(&self) -> AppResult<ProductFilter> {
        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => CategoryFilter::Any,
            Some(value) if value.eq_ignore_ascii_case("none") => CategoryFilter::Uncategorized,
            Some(value) => CategoryFilter::Category(parse_id(value, "category")?),
        };
        Ok(ProductFilter {
            category,
            query: self.q.clone(),
        })
    }
}

/// Request body for creating or replacing a product
#[derive(Debug, Deserialize)]
pub struct ProductBody {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Category ID
    #[serde(default)]
    pub category_id: Option<String>,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price
    #[serde(default)]
    pub price: Option<f64>,
    /// Units in stock
    #[serde(default)]
    pub stock: Option<i64>,
    /// Ingredient IDs in composition order
    #[serde(default)]
    pub composition: Vec<String>,
    /// Image file name returned by the upload endpoint
    #[serde(default)]
    pub image: Option<String>,
}

/// Products routes handler
pub struct ProductsRoutes;

impl ProductsRoutes {
    /// Create all product routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/products",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/products/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    /// Handle GET /api/products - List products with resolved compositions
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<ListProductsQuery>,
    ) -> Result<Response, AppError> {
        let full = is_full_view(query.view.as_deref());
        let filter = query.filter()?;
        let products = resources.database.products().list(&filter).await?;

        let builder = CompositionViewBuilder::new(
            resources.database.as_ref(),
            resources.max_expansion_depth(),
            full,
        );
        let views = builder.build_all(&products).await?;
        let categories: HashMap<Uuid, String> = resources
            .database
            .categories()
            .list()
            .await?
            .into_iter()
            .map(|category| (category.id, category.name))
            .collect();

        let products: Vec<ProductResponse> = products
            .into_iter()
            .zip(views)
            .map(|(product, view)| {
                let category_name = product
                    .category_id
                    .and_then(|id| categories.get(&id).cloned());
                ProductResponse::new(product, view, category_name)
            })
            .collect();

        let response = ListProductsResponse {
            total: products.len(),
            products,
            metadata: ListMetadata::now(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/products - Create a product
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<ProductBody>,
    ) -> Result<Response, AppError> {
        let input = Self::validate(&resources, body).await?;
        let product = resources.database.products().create(&input).await?;

        resources.events.notify(
            CatalogCollection::Products,
            CatalogAction::Created,
            product.id,
        );
        let response = Self::respond(&resources, product, false).await?;
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/products/:id - Get a product
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        Query(query): Query<ViewQuery>,
    ) -> Result<Response, AppError> {
        let product_id = parse_id(&id, "product")?;
        let product = resources
            .database
            .products()
            .get(product_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Product {id}")))?;

        let response = Self::respond(&resources, product, query.is_full()).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PUT /api/products/:id - Replace a product
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        Json(body): Json<ProductBody>,
    ) -> Result<Response, AppError> {
        let product_id = parse_id(&id, "product")?;
        let previous = resources
            .database
            .products()
            .get(product_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Product {id}")))?;

        let input = Self::validate(&resources, body).await?;
        let product = resources
            .database
            .products()
            .update(product_id, &input)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Product {id}")))?;

        if let Some(old_image) = previous.image.as_deref() {
            if product.image.as_deref() != Some(old_image) {
                Self::discard_image(&resources, old_image, product.id).await;
            }
        }

        resources.events.notify(
            CatalogCollection::Products,
            CatalogAction::Updated,
            product.id,
        );
        let response = Self::respond(&resources, product, false).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /api/products/:id - Delete a product and its image
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let product_id = parse_id(&id, "product")?;
        let product = resources
            .database
            .products()
            .get(product_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Product {id}")))?;

        if !resources.database.products().delete(product_id).await? {
            return Err(AppError::not_found(format!("Product {id}")));
        }
        if let Some(image) = product.image.as_deref() {
            Self::discard_image(&resources, image, product_id).await;
        }

        resources.events.notify(
            CatalogCollection::Products,
            CatalogAction::Deleted,
            product_id,
        );
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Turn a request body into a write, checking values and references
    async fn validate(resources: &ServerResources, body: ProductBody) -> AppResult<ProductInput> {
        let name = required_name(&body.name)?;

        let price = body.price.ok_or_else(|| AppError::missing_field("price"))?;
        if !price.is_finite() || price < 0.0 {
            return Err(AppError::out_of_range(
                "Field 'price' must be a non-negative number",
            ));
        }

        let stock = u32::try_from(body.stock.unwrap_or(0)).map_err(|_| {
            AppError::out_of_range(format!(
                "Field 'stock' must be between 0 and {}",
                u32::MAX
            ))
        })?;

        let category_id = parse_optional_id(body.category_id.as_deref(), "category")?;
        if let Some(category_id) = category_id {
            if resources
                .database
                .categories()
                .get(category_id)
                .await?
                .is_none()
            {
                return Err(AppError::invalid_input(format!(
                    "Unknown category {category_id}"
                )));
            }
        }

        let composition = parse_id_list(&body.composition, "ingredient")?;
        let missing = resources
            .database
            .ingredients()
            .find_missing(&composition)
            .await?;
        if !missing.is_empty() {
            return Err(AppError::invalid_input(format!(
                "Unknown ingredients: {}",
                join_ids(&missing)
            )));
        }

        let image = match body.image.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(name) => {
                ImageStore::validate_name(name)?;
                Some(name.to_owned())
            }
        };

        Ok(ProductInput {
            name,
            category_id,
            description: optional_text(body.description, "description")?,
            price,
            stock,
            composition,
            image,
        })
    }

    async fn respond(
        resources: &ServerResources,
        product: Product,
        full: bool,
    ) -> AppResult<ProductResponse> {
        let builder = CompositionViewBuilder::new(
            resources.database.as_ref(),
            resources.max_expansion_depth(),
            full,
        );
        let view = builder.build(&product).await?;
        let category_name = match product.category_id {
            Some(id) => resources
                .database
                .categories()
                .get(id)
                .await?
                .map(|category| category.name),
            None => None,
        };
        Ok(ProductResponse::new(product, view, category_name))
    }

    /// Remove an image no product refers to anymore; failures are logged only
    async fn discard_image(resources: &ServerResources, name: &str, owner: Uuid) {
        match resources
            .database
            .products()
            .count_image_refs(name, Some(owner))
            .await
        {
            Ok(0) => {}
            Ok(shared) => {
                debug!(image.name = %name, shared, "Keeping product image still in use");
                return;
            }
            Err(e) => {
                warn!(image.name = %name, "Failed to check product image references: {e}");
                return;
            }
        }

        match resources.images.delete(name).await {
            Ok(()) => {
                resources
                    .events
                    .notify(CatalogCollection::Images, CatalogAction::Deleted, name);
            }
            Err(e) => warn!(image.name = %name, "Failed to remove product image: {e}"),
        }
    }
}

// ABOUTME: Route handlers for the product category REST API
// ABOUTME: CRUD endpoints; deleting a category leaves its products uncategorized
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{optional_text, parse_id, required_name, ListMetadata};
use crate::database::CategoryInput;
use crate::errors::{AppError, AppResult};
use crate::events::{CatalogAction, CatalogCollection};
use crate::models::Category;
use crate::resources::ServerResources;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Response for a category
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryResponse {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name,
            description: category.description,
            created_at: category.created_at.to_rfc3339(),
            updated_at: category.updated_at.to_rfc3339(),
        }
    }
}

/// Response for listing categories
#[derive(Debug, Serialize, Deserialize)]
pub struct ListCategoriesResponse {
    /// Categories ordered by name
    pub categories: Vec<CategoryResponse>,
    /// Number of categories
    pub total: usize,
    /// Metadata
    pub metadata: ListMetadata,
}

/// Request body for creating or replacing a category
#[derive(Debug, Deserialize)]
pub struct CategoryBody {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}

impl TryFrom<CategoryBody> for CategoryInput {
    type Error = AppError;

    fn try_from(body: CategoryBody) -> AppResult<Self> {
        Ok(Self {
            name: required_name(&body.name)?,
            description: optional_text(body.description, "description")?,
        })
    }
}

/// Categories routes handler
pub struct CategoriesRoutes;

impl CategoriesRoutes {
    /// Create all category routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/categories",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/categories/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    /// Handle GET /api/categories - List categories
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let categories = resources.database.categories().list().await?;

        let response = ListCategoriesResponse {
            total: categories.len(),
            categories: categories.into_iter().map(Into::into).collect(),
            metadata: ListMetadata::now(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/categories - Create a category
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<CategoryBody>,
    ) -> Result<Response, AppError> {
        let input = CategoryInput::try_from(body)?;
        let category = resources.database.categories().create(&input).await?;

        resources.events.notify(
            CatalogCollection::Categories,
            CatalogAction::Created,
            category.id,
        );
        let response: CategoryResponse = category.into();
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/categories/:id - Get a category
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let category_id = parse_id(&id, "category")?;
        let category = resources
            .database
            .categories()
            .get(category_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Category {id}")))?;

        let response: CategoryResponse = category.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PUT /api/categories/:id - Replace a category
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        Json(body): Json<CategoryBody>,
    ) -> Result<Response, AppError> {
        let category_id = parse_id(&id, "category")?;
        let input = CategoryInput::try_from(body)?;
        let category = resources
            .database
            .categories()
            .update(category_id, &input)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Category {id}")))?;

        resources.events.notify(
            CatalogCollection::Categories,
            CatalogAction::Updated,
            category.id,
        );
        let response: CategoryResponse = category.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /api/categories/:id - Delete a category
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let category_id = parse_id(&id, "category")?;
        if !resources.database.categories().delete(category_id).await? {
            return Err(AppError::not_found(format!("Category {id}")));
        }

        let detached = resources
            .database
            .products()
            .clear_category(category_id)
            .await?;
        if detached > 0 {
            info!(category.id = %category_id, products = detached, "Products left uncategorized");
            resources.events.notify(
                CatalogCollection::Products,
                CatalogAction::Updated,
                category_id,
            );
        }
        resources.events.notify(
            CatalogCollection::Categories,
            CatalogAction::Deleted,
            category_id,
        );
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }
}

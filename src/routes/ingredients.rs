// ABOUTME: Route handlers for the ingredient REST API and allergen catalog
// ABOUTME: Validates composite structure and references before writing ingredients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{parse_id, parse_id_list, parse_optional_id, required_name, ListMetadata};
use crate::constants::labels;
use crate::database::{IngredientFilter, IngredientInput};
use crate::errors::{AppError, AppResult};
use crate::events::{CatalogAction, CatalogCollection};
use crate::models::{allergens_from_value, Ingredient, IngredientKind};
use crate::resources::ServerResources;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Ingredient as returned by the API
#[derive(Debug, Serialize)]
pub struct IngredientResponse {
    /// Stored ingredient fields
    #[serde(flatten)]
    pub ingredient: Ingredient,
    /// Supplier name, or the "no supplier" label
    pub supplier_label: String,
}

/// Response for listing ingredients
#[derive(Debug, Serialize)]
pub struct ListIngredientsResponse {
    /// Ingredients ordered by name
    pub ingredients: Vec<IngredientResponse>,
    /// Number of ingredients
    pub total: usize,
    /// Metadata
    pub metadata: ListMetadata,
}

/// Response for the allergen catalog
#[derive(Debug, Serialize, Deserialize)]
pub struct AllergensResponse {
    /// Distinct allergen names, sorted
    pub allergens: Vec<String>,
    /// Number of allergens
    pub total: usize,
}

/// Query parameters for listing ingredients
#[derive(Debug, Deserialize, Default)]
pub struct ListIngredientsQuery {
    /// `simple` or `compose`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Name substring
    pub q: Option<String>,
}

/// Request body for creating or replacing an ingredient
#[derive(Debug, Deserialize)]
pub struct IngredientBody {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// `simple` (default) or `compose`
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Sub-ingredient IDs of a composite ingredient
    #[serde(default)]
    pub sub_ingredient_ids: Vec<String>,
    /// Declared allergens; anything but a list of strings counts as none
    #[serde(default)]
    pub allergens: Value,
    /// Vegan flag
    #[serde(default)]
    pub vegan: bool,
    /// Vegetarian flag
    #[serde(default)]
    pub vegeta: bool,
    /// Supplier ID
    #[serde(default)]
    pub supplier_id: Option<String>,
}

fn parse_kind(raw: Option<&str>) -> AppResult<Option<IngredientKind>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => IngredientKind::parse(value).map(Some).ok_or_else(|| {
            AppError::invalid_input(format!(
                "Unknown ingredient type '{value}', expected 'simple' or 'compose'"
            ))
        }),
    }
}

/// Ingredients routes handler
pub struct IngredientsRoutes;

impl IngredientsRoutes {
    /// Create all ingredient routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/ingredients",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/ingredients/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route("/api/allergens", get(Self::handle_allergens))
            .with_state(resources)
    }

    /// Handle GET /api/ingredients - List ingredients
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        Query(query): Query<ListIngredientsQuery>,
    ) -> Result<Response, AppError> {
        let filter = IngredientFilter {
            kind: parse_kind(query.kind.as_deref())?,
            query: query.q,
        };
        let ingredients = resources.database.ingredients().list(&filter).await?;
        let suppliers: HashMap<Uuid, String> = resources
            .database
            .suppliers()
            .list()
            .await?
            .into_iter()
            .map(|supplier| (supplier.id, supplier.name))
            .collect();

        let ingredients: Vec<IngredientResponse> = ingredients
            .into_iter()
            .map(|ingredient| {
                let supplier_label = supplier_label(
                    ingredient
                        .supplier_id
                        .and_then(|id| suppliers.get(&id).cloned()),
                );
                IngredientResponse {
                    ingredient,
                    supplier_label,
                }
            })
            .collect();

        let response = ListIngredientsResponse {
            total: ingredients.len(),
            ingredients,
            metadata: ListMetadata::now(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/ingredients - Create an ingredient
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<IngredientBody>,
    ) -> Result<Response, AppError> {
        let input = Self::validate(&resources, body).await?;
        let ingredient = resources.database.ingredients().create(&input).await?;

        resources.events.notify(
            CatalogCollection::Ingredients,
            CatalogAction::Created,
            ingredient.id,
        );
        let response = Self::respond(&resources, ingredient).await?;
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/ingredients/:id - Get an ingredient
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let ingredient_id = parse_id(&id, "ingredient")?;
        let ingredient = resources
            .database
            .ingredients()
            .get(ingredient_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Ingredient {id}")))?;

        let response = Self::respond(&resources, ingredient).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PUT /api/ingredients/:id - Replace an ingredient
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        Json(body): Json<IngredientBody>,
    ) -> Result<Response, AppError> {
        let ingredient_id = parse_id(&id, "ingredient")?;
        let input = Self::validate(&resources, body).await?;
        let ingredient = resources
            .database
            .ingredients()
            .update(ingredient_id, &input)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Ingredient {id}")))?;

        resources.events.notify(
            CatalogCollection::Ingredients,
            CatalogAction::Updated,
            ingredient.id,
        );
        let response = Self::respond(&resources, ingredient).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /api/ingredients/:id - Delete an ingredient
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let ingredient_id = parse_id(&id, "ingredient")?;
        if !resources.database.ingredients().delete(ingredient_id).await? {
            return Err(AppError::not_found(format!("Ingredient {id}")));
        }

        resources.events.notify(
            CatalogCollection::Ingredients,
            CatalogAction::Deleted,
            ingredient_id,
        );
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Handle GET /api/allergens - Distinct declared allergens
    async fn handle_allergens(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let allergens = resources.database.ingredients().list_allergens().await?;
        let response = AllergensResponse {
            total: allergens.len(),
            allergens,
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Turn a request body into a write, checking structure and references
    async fn validate(
        resources: &ServerResources,
        body: IngredientBody,
    ) -> AppResult<IngredientInput> {
        let name = required_name(&body.name)?;
        let kind = parse_kind(body.kind.as_deref())?.unwrap_or_default();
        let sub_ingredient_ids = parse_id_list(&body.sub_ingredient_ids, "ingredient")?;

        match kind {
            IngredientKind::Simple if !sub_ingredient_ids.is_empty() => {
                return Err(AppError::invalid_input(
                    "A simple ingredient cannot have sub-ingredients",
                ));
            }
            IngredientKind::Compose if sub_ingredient_ids.is_empty() => {
                return Err(AppError::invalid_input(
                    "A composite ingredient needs at least one sub-ingredient",
                ));
            }
            _ => {}
        }

        let missing = resources
            .database
            .ingredients()
            .find_missing(&sub_ingredient_ids)
            .await?;
        if !missing.is_empty() {
            return Err(AppError::invalid_input(format!(
                "Unknown sub-ingredients: {}",
                join_ids(&missing)
            )));
        }

        let supplier_id = parse_optional_id(body.supplier_id.as_deref(), "supplier")?;
        if let Some(supplier_id) = supplier_id {
            if resources.database.suppliers().get(supplier_id).await?.is_none() {
                return Err(AppError::invalid_input(format!(
                    "Unknown supplier {supplier_id}"
                )));
            }
        }

        Ok(IngredientInput {
            name,
            kind,
            sub_ingredient_ids,
            allergens: allergens_from_value(&body.allergens),
            vegan: body.vegan,
            vegetarian: body.vegeta,
            supplier_id,
        })
    }

    async fn respond(
        resources: &ServerResources,
        ingredient: Ingredient,
    ) -> AppResult<IngredientResponse> {
        let supplier_name = match ingredient.supplier_id {
            Some(id) => resources
                .database
                .suppliers()
                .get(id)
                .await?
                .map(|supplier| supplier.name),
            None => None,
        };
        Ok(IngredientResponse {
            ingredient,
            supplier_label: supplier_label(supplier_name),
        })
    }
}

fn supplier_label(name: Option<String>) -> String {
    name.unwrap_or_else(|| labels::NO_SUPPLIER.to_owned())
}

pub(crate) fn join_ids(ids: &[Uuid]) -> String {
    ids.iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

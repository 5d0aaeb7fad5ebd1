// ABOUTME: Route handlers for the ingredient supplier REST API
// ABOUTME: CRUD endpoints; deleting a supplier detaches it from its ingredients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{optional_text, parse_id, required_name, ListMetadata};
use crate::database::SupplierInput;
use crate::errors::{AppError, AppResult};
use crate::events::{CatalogAction, CatalogCollection};
use crate::models::Supplier;
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

/// Response for a supplier
#[derive(Debug, Serialize, Deserialize)]
pub struct SupplierResponse {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Contact person
    pub contact: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Contact phone number
    pub phone: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl From<Supplier> for SupplierResponse {
    fn from(supplier: Supplier) -> Self {
        Self {
            id: supplier.id.to_string(),
            name: supplier.name,
            contact: supplier.contact,
            email: supplier.email,
            phone: supplier.phone,
            address: supplier.address,
            created_at: supplier.created_at.to_rfc3339(),
            updated_at: supplier.updated_at.to_rfc3339(),
        }
    }
}

/// Response for listing suppliers
#[derive(Debug, Serialize, Deserialize)]
pub struct ListSuppliersResponse {
    /// Suppliers ordered by name
    pub suppliers: Vec<SupplierResponse>,
    /// Number of suppliers
    pub total: usize,
    /// Metadata
    pub metadata: ListMetadata,
}

/// Request body for creating or replacing a supplier
#[derive(Debug, Deserialize)]
pub struct SupplierBody {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Contact person
    #[serde(default)]
    pub contact: Option<String>,
    /// Contact email
    #[serde(default)]
    pub email: Option<String>,
    /// Contact phone number
    #[serde(default)]
    pub phone: Option<String>,
    /// Postal address
    #[serde(default)]
    pub address: Option<String>,
}

impl TryFrom<SupplierBody> for SupplierInput {
    type Error = AppError;

    fn try_from(body: SupplierBody) -> AppResult<Self> {
        let email = optional_text(body.email, "email")?;
        if let Some(email) = email.as_deref() {
            if !email.contains('@') {
                return Err(AppError::invalid_format(format!(
                    "Invalid email address '{email}'"
                )));
            }
        }
        Ok(Self {
            name: required_name(&body.name)?,
            contact: optional_text(body.contact, "contact")?,
            email,
            phone: optional_text(body.phone, "phone")?,
            address: optional_text(body.address, "address")?,
        })
    }
}

/// Suppliers routes handler
pub struct SuppliersRoutes;

impl SuppliersRoutes {
    /// Create all supplier routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/suppliers",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/suppliers/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    /// Handle GET /api/suppliers - List suppliers
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let suppliers = resources.database.suppliers().list().await?;

        let response = ListSuppliersResponse {
            total: suppliers.len(),
            suppliers: suppliers.into_iter().map(Into::into).collect(),
            metadata: ListMetadata::now(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/suppliers - Create a supplier
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<SupplierBody>,
    ) -> Result<Response, AppError> {
        let input = SupplierInput::try_from(body)?;
        let supplier = resources.database.suppliers().create(&input).await?;

        resources.events.notify(
            CatalogCollection::Suppliers,
            CatalogAction::Created,
            supplier.id,
        );
        let response: SupplierResponse = supplier.into();
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/suppliers/:id - Get a supplier
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let supplier_id = parse_id(&id, "supplier")?;
        let supplier = resources
            .database
            .suppliers()
            .get(supplier_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Supplier {id}")))?;

        let response: SupplierResponse = supplier.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PUT /api/suppliers/:id - Replace a supplier
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        Json(body): Json<SupplierBody>,
    ) -> Result<Response, AppError> {
        let supplier_id = parse_id(&id, "supplier")?;
        let input = SupplierInput::try_from(body)?;
        let supplier = resources
            .database
            .suppliers()
            .update(supplier_id, &input)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Supplier {id}")))?;

        resources.events.notify(
            CatalogCollection::Suppliers,
            CatalogAction::Updated,
            supplier.id,
        );
        let response: SupplierResponse = supplier.into();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle DELETE /api/suppliers/:id - Delete a supplier
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let supplier_id = parse_id(&id, "supplier")?;
        if !resources.database.suppliers().delete(supplier_id).await? {
            return Err(AppError::not_found(format!("Supplier {id}")));
        }

        let detached = resources
            .database
            .ingredients()
            .clear_supplier(supplier_id)
            .await?;
        if detached > 0 {
            info!(supplier.id = %supplier_id, ingredients = detached, "Ingredients left without supplier");
            resources.events.notify(
                CatalogCollection::Ingredients,
                CatalogAction::Updated,
                supplier_id,
            );
        }
        resources.events.notify(
            CatalogCollection::Suppliers,
            CatalogAction::Deleted,
            supplier_id,
        );
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }
}

// ABOUTME: HTTP route modules for the catalog REST API
// ABOUTME: Shared identifier parsing, field validation, and list metadata helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Catalog REST API routes
//!
//! Each collection exposes a `XRoutes::routes(resources)` constructor
//! returning an axum [`Router`](axum::Router) with its state applied.

/// Category CRUD
pub mod categories;
/// Catalog change stream (SSE)
pub mod events;
/// Health and readiness probes
pub mod health;
/// Image upload, download and deletion
pub mod images;
/// Ingredient CRUD and allergen catalog
pub mod ingredients;
/// Product CRUD with dietary full view
pub mod products;
/// Supplier CRUD
pub mod suppliers;

pub use categories::CategoriesRoutes;
pub use events::EventsRoutes;
pub use health::HealthRoutes;
pub use images::ImagesRoutes;
pub use ingredients::IngredientsRoutes;
pub use products::ProductsRoutes;
pub use suppliers::SuppliersRoutes;

use crate::constants::{api, limits};
use crate::errors::{AppError, AppResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata attached to list responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMetadata {
    /// Response timestamp
    pub timestamp: String,
    /// API version
    pub api_version: String,
}

impl ListMetadata {
    /// Metadata stamped now
    #[must_use]
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            api_version: api::API_VERSION.to_owned(),
        }
    }
}

/// Parse an identifier received in a path or body
pub(crate) fn parse_id(raw: &str, resource: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::invalid_format(format!("Invalid {resource} id '{raw}'")))
}

/// Parse an optional reference; blank strings mean "no reference"
pub(crate) fn parse_optional_id(raw: Option<&str>, resource: &str) -> AppResult<Option<Uuid>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_id(value, resource).map(Some),
    }
}

/// Parse an ordered list of references, dropping repeats
pub(crate) fn parse_id_list(raw: &[String], resource: &str) -> AppResult<Vec<Uuid>> {
    let mut ids: Vec<Uuid> = Vec::with_capacity(raw.len());
    for value in raw {
        let id = parse_id(value, resource)?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Trimmed, non-blank, bounded record name
pub(crate) fn required_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::missing_field("name"));
    }
    if name.chars().count() > limits::MAX_NAME_LENGTH {
        return Err(AppError::out_of_range(format!(
            "Field 'name' must be at most {} characters",
            limits::MAX_NAME_LENGTH
        )));
    }
    Ok(name.to_owned())
}

/// Trimmed optional free text; blank becomes `None`
pub(crate) fn optional_text(raw: Option<String>, field: &str) -> AppResult<Option<String>> {
    let Some(text) = raw else {
        return Ok(None);
    };
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    if text.chars().count() > limits::MAX_DESCRIPTION_LENGTH {
        return Err(AppError::out_of_range(format!(
            "Field '{field}' must be at most {} characters",
            limits::MAX_DESCRIPTION_LENGTH
        )));
    }
    Ok(Some(text.to_owned()))
}

// ABOUTME: Product record with price, stock, optional category, and ordered ingredient composition
// ABOUTME: Dietary fields are derived on read and never stored on the record
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sellable product of the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier
    pub id: Uuid,
    /// Display name, unique in the catalog
    pub name: String,
    /// Optional category reference
    #[serde(default)]
    pub category_id: Option<Uuid>,
    /// Free text description
    #[serde(default)]
    pub description: Option<String>,
    /// Unit price
    pub price: f64,
    /// Units in stock
    #[serde(default)]
    pub stock: u32,
    /// Ordered ingredient references
    #[serde(default)]
    pub composition: Vec<Uuid>,
    /// Stored image file name
    #[serde(default)]
    pub image: Option<String>,
    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Create an uncategorized product without composition
    #[must_use]
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category_id: None,
            description: None,
            price,
            stock: 0,
            composition: Vec::new(),
            image: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the ordered composition
    #[must_use]
    pub fn with_composition(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.composition = ids.into_iter().collect();
        self
    }

    /// Set the category reference
    #[must_use]
    pub const fn with_category(mut self, category_id: Option<Uuid>) -> Self {
        self.category_id = category_id;
        self
    }
}

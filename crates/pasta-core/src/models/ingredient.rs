// ABOUTME: Ingredient record with dietary flags, declared allergens, and sub-ingredient references
// ABOUTME: Tolerates missing or malformed allergen documents by treating them as empty
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Whether an ingredient is a leaf or is made of other ingredients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IngredientKind {
    /// Leaf ingredient (flour, eggs, salt)
    #[default]
    Simple,
    /// Prepared ingredient referencing sub-ingredients (fresh pasta dough)
    Compose,
}

impl IngredientKind {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Compose => "compose",
        }
    }

    /// Parse from its string representation, `None` for unknown kinds
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Some(Self::Simple),
            "compose" | "composite" => Some(Self::Compose),
            _ => None,
        }
    }
}

/// An ingredient of the catalog
///
/// `allergens`, `vegan` and `vegetarian` describe the ingredient's own
/// contribution. For composite ingredients they are maintained by hand and
/// are trusted as-is by the default dietary aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Unique identifier
    pub id: Uuid,
    /// Display name, unique in the catalog
    pub name: String,
    /// Leaf or composite
    #[serde(rename = "type", default)]
    pub kind: IngredientKind,
    /// Ordered references to the ingredients this one is made of
    #[serde(default)]
    pub sub_ingredient_ids: Vec<Uuid>,
    /// Declared allergens, deduplicated in first-seen order
    #[serde(default, deserialize_with = "deserialize_allergens")]
    pub allergens: Vec<String>,
    /// Suitable for a vegan diet
    #[serde(default)]
    pub vegan: bool,
    /// Suitable for a vegetarian diet
    #[serde(rename = "vegeta", default)]
    pub vegetarian: bool,
    /// Optional supplier reference
    #[serde(default)]
    pub supplier_id: Option<Uuid>,
    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Ingredient {
    /// Create an ingredient with no allergens, no dietary claims and no references
    #[must_use]
    pub fn new(name: impl Into<String>, kind: IngredientKind) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            sub_ingredient_ids: Vec::new(),
            allergens: Vec::new(),
            vegan: false,
            vegetarian: false,
            supplier_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the declared allergens, normalizing them
    #[must_use]
    pub fn with_allergens<'a>(mut self, allergens: impl IntoIterator<Item = &'a str>) -> Self {
        self.allergens = normalize_allergens(allergens);
        self
    }

    /// Set the vegan and vegetarian flags
    #[must_use]
    pub const fn with_diet(mut self, vegan: bool, vegetarian: bool) -> Self {
        self.vegan = vegan;
        self.vegetarian = vegetarian;
        self
    }

    /// Set the sub-ingredient references
    #[must_use]
    pub fn with_sub_ingredients(mut self, ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.sub_ingredient_ids = ids.into_iter().collect();
        self
    }

    /// Set the supplier reference
    #[must_use]
    pub const fn with_supplier(mut self, supplier_id: Option<Uuid>) -> Self {
        self.supplier_id = supplier_id;
        self
    }

    /// Whether sub-ingredients should be expanded for this ingredient
    #[must_use]
    pub fn is_composite(&self) -> bool {
        self.kind == IngredientKind::Compose && !self.sub_ingredient_ids.is_empty()
    }
}

/// Trim, drop blanks and deduplicate allergen names keeping first-seen order
#[must_use]
pub fn normalize_allergens<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut allergens: Vec<String> = Vec::new();
    for name in names {
        let trimmed = name.trim();
        if trimmed.is_empty() || allergens.iter().any(|known| known == trimmed) {
            continue;
        }
        allergens.push(trimmed.to_owned());
    }
    allergens
}

/// Read an allergen list from an untyped document value
///
/// Anything but an array yields an empty list; non-string elements are skipped.
#[must_use]
pub fn allergens_from_value(value: &Value) -> Vec<String> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    normalize_allergens(items.iter().filter_map(Value::as_str))
}

fn deserialize_allergens<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(allergens_from_value(&value))
}

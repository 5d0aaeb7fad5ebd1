// ABOUTME: Catalog record types shared by the store, the dietary resolver, and the HTTP layer
// ABOUTME: Re-exports ingredients, products, categories, and suppliers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Catalog records
//!
//! Category and supplier references are `Option<Uuid>`: an unset reference
//! and a reference to a deleted record both render with the fallback labels
//! from [`crate::constants::labels`].

mod category;
mod ingredient;
mod product;
mod supplier;

pub use category::Category;
pub use ingredient::{allergens_from_value, normalize_allergens, Ingredient, IngredientKind};
pub use product::Product;
pub use supplier::Supplier;

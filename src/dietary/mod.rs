// ABOUTME: Dietary profile derivation over the product composition graph
// ABOUTME: Expands ingredient references, then folds allergens and vegan/vegetarian flags
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Dietary Profiles
//!
//! A product's dietary profile is derived on every full-view read and never
//! stored:
//!
//! 1. [`expansion::CompositionExpander`] turns the product's ordered
//!    ingredient IDs into [`ResolvedIngredient`] trees
//! 2. [`resolver::DietaryResolver`] folds those trees into a
//!    [`DietaryProfile`]
//!
//! `max_expansion_depth` controls how many ingredient levels take part.
//! With the default of `1`, only the product's direct ingredients count and
//! the flags declared on composite ingredients are trusted as-is.

/// Composition expansion with cycle guarding
pub mod expansion;
/// Allergen and diet flag aggregation
pub mod resolver;
/// Composition plus profile for product responses
pub mod view;

pub use expansion::{CompositionExpander, ResolvedIngredient};
pub use resolver::{resolve_dietary_profile, DietaryProfile, DietaryResolver};
pub use view::{CompositionView, CompositionViewBuilder};

// ABOUTME: Folds resolved ingredients into a product's allergen list and diet flags
// ABOUTME: Pure aggregation with AND semantics over diet flags and first-seen allergen order
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::expansion::ResolvedIngredient;
use crate::constants::defaults;
use crate::models::Ingredient;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Derived allergen and diet information for a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DietaryProfile {
    /// Union of contributing allergens, first-seen order, no duplicates
    pub allergens: Vec<String>,
    /// Every contributing ingredient is vegan
    pub vegan: bool,
    /// Every contributing ingredient is vegetarian
    #[serde(rename = "vegeta")]
    pub vegetarian: bool,
}

/// Aggregates a composition into a [`DietaryProfile`]
///
/// Only ingredients within `max_depth` levels contribute: direct composition
/// entries are level 1, their sub-ingredients level 2, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DietaryResolver {
    max_depth: usize,
}

impl Default for DietaryResolver {
    fn default() -> Self {
        Self::with_max_depth(defaults::MAX_EXPANSION_DEPTH)
    }
}

impl DietaryResolver {
    /// Resolver aggregating `max_depth` ingredient levels (at least one)
    #[must_use]
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(1),
        }
    }

    /// Number of aggregated levels
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Derive the profile of a composition
    ///
    /// `None` entries (dangling references) are skipped. A composition with
    /// no resolved entry yields an empty profile with both flags `false`.
    #[must_use]
    pub fn resolve(&self, ingredients: &[Option<ResolvedIngredient>]) -> DietaryProfile {
        let mut accumulator = ProfileAccumulator::default();
        for entry in ingredients.iter().flatten() {
            self.fold(entry, 1, &mut accumulator);
        }
        accumulator.finish()
    }

    fn fold(&self, node: &ResolvedIngredient, level: usize, accumulator: &mut ProfileAccumulator) {
        accumulator.absorb(&node.ingredient);
        if level >= self.max_depth {
            return;
        }
        for sub in node.sub_ingredients.iter().flatten() {
            self.fold(sub, level + 1, accumulator);
        }
    }
}

/// Derive a profile with the default shallow aggregation
#[must_use]
pub fn resolve_dietary_profile(ingredients: &[Option<ResolvedIngredient>]) -> DietaryProfile {
    DietaryResolver::default().resolve(ingredients)
}

struct ProfileAccumulator {
    allergens: Vec<String>,
    seen: HashSet<String>,
    vegan: bool,
    vegetarian: bool,
    absorbed: usize,
}

impl Default for ProfileAccumulator {
    fn default() -> Self {
        Self {
            allergens: Vec::new(),
            seen: HashSet::new(),
            vegan: true,
            vegetarian: true,
            absorbed: 0,
        }
    }
}

impl ProfileAccumulator {
    fn absorb(&mut self, ingredient: &Ingredient) {
        self.absorbed += 1;
        for allergen in &ingredient.allergens {
            if self.seen.insert(allergen.clone()) {
                self.allergens.push(allergen.clone());
            }
        }
        self.vegan &= ingredient.vegan;
        self.vegetarian &= ingredient.vegetarian;
    }

    fn finish(self) -> DietaryProfile {
        // No known composition never qualifies as vegan or vegetarian
        if self.absorbed == 0 {
            return DietaryProfile::default();
        }
        DietaryProfile {
            allergens: self.allergens,
            vegan: self.vegan,
            vegetarian: self.vegetarian,
        }
    }
}

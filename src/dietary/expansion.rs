// ABOUTME: Expands ingredient references into resolved ingredient trees
// ABOUTME: Loads records level by level, leaves dangling references empty, and breaks cycles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::AppResult;
use crate::models::Ingredient;
use crate::store::CatalogStore;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use uuid::Uuid;

/// An ingredient with its sub-ingredients resolved
///
/// Serializes as the ingredient's own fields plus a `sub_ingredients` array
/// in which unresolvable references appear as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedIngredient {
    /// The ingredient record
    #[serde(flatten)]
    pub ingredient: Ingredient,
    /// Populated sub-ingredients, in reference order
    pub sub_ingredients: Vec<Option<ResolvedIngredient>>,
}

impl From<Ingredient> for ResolvedIngredient {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            ingredient,
            sub_ingredients: Vec::new(),
        }
    }
}

impl ResolvedIngredient {
    /// Attach already resolved sub-ingredients
    #[must_use]
    pub fn with_sub_ingredients(
        mut self,
        sub_ingredients: impl IntoIterator<Item = Option<Self>>,
    ) -> Self {
        self.sub_ingredients = sub_ingredients.into_iter().collect();
        self
    }
}

/// Resolves product compositions against a [`CatalogStore`]
///
/// Sub-ingredients are populated `max(max_depth - 1, 1)` levels below the
/// direct entries, so the default depth of 1 still shows one level of
/// sub-ingredients while deeper aggregation has every record it needs.
pub struct CompositionExpander<'a, S: CatalogStore + ?Sized> {
    store: &'a S,
    max_depth: usize,
}

impl<'a, S: CatalogStore + ?Sized> CompositionExpander<'a, S> {
    /// Create an expander reading from `store`
    #[must_use]
    pub fn new(store: &'a S, max_depth: usize) -> Self {
        Self {
            store,
            max_depth: max_depth.max(1),
        }
    }

    /// Number of sub-ingredient levels populated below direct entries
    #[must_use]
    pub fn populated_levels(&self) -> usize {
        self.max_depth.saturating_sub(1).max(1)
    }

    /// Resolve one composition
    ///
    /// The result has one entry per input ID, in order; unknown IDs yield `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn expand(&self, ids: &[Uuid]) -> AppResult<Vec<Option<ResolvedIngredient>>> {
        let records = self.load(ids.iter().copied()).await?;
        Ok(self.assemble(ids, &records))
    }

    /// Resolve several compositions sharing one set of store lookups
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn expand_all(
        &self,
        compositions: &[&[Uuid]],
    ) -> AppResult<Vec<Vec<Option<ResolvedIngredient>>>> {
        let roots = compositions.iter().flat_map(|ids| ids.iter().copied());
        let records = self.load(roots).await?;
        Ok(compositions
            .iter()
            .map(|ids| self.assemble(ids, &records))
            .collect())
    }

    /// Fetch every record reachable within the populated levels
    async fn load(
        &self,
        roots: impl Iterator<Item = Uuid>,
    ) -> AppResult<HashMap<Uuid, Ingredient>> {
        let mut records: HashMap<Uuid, Ingredient> = HashMap::new();
        let mut requested: HashSet<Uuid> = HashSet::new();
        let mut frontier: Vec<Uuid> = roots.filter(|id| requested.insert(*id)).collect();
        let populated_levels = self.populated_levels();

        for level in 0..=populated_levels {
            if frontier.is_empty() {
                break;
            }
            let fetched = self.store.get_ingredients(&frontier).await?;
            debug!(
                level,
                requested = frontier.len(),
                fetched = fetched.len(),
                "Loaded composition level"
            );

            let mut next = Vec::new();
            for ingredient in fetched {
                if level < populated_levels && ingredient.is_composite() {
                    next.extend(
                        ingredient
                            .sub_ingredient_ids
                            .iter()
                            .copied()
                            .filter(|id| requested.insert(*id)),
                    );
                }
                records.insert(ingredient.id, ingredient);
            }
            frontier = next;
        }

        Ok(records)
    }

    fn assemble(
        &self,
        ids: &[Uuid],
        records: &HashMap<Uuid, Ingredient>,
    ) -> Vec<Option<ResolvedIngredient>> {
        let mut path = Vec::new();
        ids.iter()
            .map(|id| self.build(*id, 0, records, &mut path))
            .collect()
    }

    fn build(
        &self,
        id: Uuid,
        level: usize,
        records: &HashMap<Uuid, Ingredient>,
        path: &mut Vec<Uuid>,
    ) -> Option<ResolvedIngredient> {
        let ingredient = records.get(&id)?;
        let mut resolved = ResolvedIngredient::from(ingredient.clone());
        if level >= self.populated_levels() || !ingredient.is_composite() {
            return Some(resolved);
        }

        path.push(id);
        for sub_id in &ingredient.sub_ingredient_ids {
            if path.contains(sub_id) {
                warn!(
                    ingredient.id = %id,
                    sub_ingredient.id = %sub_id,
                    "Cyclic sub-ingredient reference skipped"
                );
                continue;
            }
            let sub = self.build(*sub_id, level + 1, records, path);
            resolved.sub_ingredients.push(sub);
        }
        path.pop();

        Some(resolved)
    }
}

// ABOUTME: Builds the composition and optional dietary profile shown with a product
// ABOUTME: Shares one expansion pass across all products of a listing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::expansion::{CompositionExpander, ResolvedIngredient};
use super::resolver::{DietaryProfile, DietaryResolver};
use crate::errors::AppResult;
use crate::logging::CatalogLogger;
use crate::models::Product;
use crate::store::CatalogStore;
use uuid::Uuid;

/// Resolved composition of one product, with its profile on full views
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionView {
    /// Composition entries in product order, `None` for dangling references
    pub composition: Vec<Option<ResolvedIngredient>>,
    /// Derived profile, present only when requested
    pub dietary: Option<DietaryProfile>,
}

/// Produces [`CompositionView`]s for products
pub struct CompositionViewBuilder<'a, S: CatalogStore + ?Sized> {
    expander: CompositionExpander<'a, S>,
    resolver: DietaryResolver,
    full: bool,
}

impl<'a, S: CatalogStore + ?Sized> CompositionViewBuilder<'a, S> {
    /// Create a builder; `full` enables dietary profile derivation
    #[must_use]
    pub fn new(store: &'a S, max_depth: usize, full: bool) -> Self {
        Self {
            expander: CompositionExpander::new(store, max_depth),
            resolver: DietaryResolver::with_max_depth(max_depth),
            full,
        }
    }

    /// View of a single product
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn build(&self, product: &Product) -> AppResult<CompositionView> {
        let composition = self.expander.expand(&product.composition).await?;
        Ok(self.finish(product, composition))
    }

    /// Views of several products, in input order
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails
    pub async fn build_all(&self, products: &[Product]) -> AppResult<Vec<CompositionView>> {
        let ids: Vec<&[Uuid]> = products
            .iter()
            .map(|product| product.composition.as_slice())
            .collect();
        let expanded = self.expander.expand_all(&ids).await?;
        Ok(products
            .iter()
            .zip(expanded)
            .map(|(product, composition)| self.finish(product, composition))
            .collect())
    }

    fn finish(
        &self,
        product: &Product,
        composition: Vec<Option<ResolvedIngredient>>,
    ) -> CompositionView {
        let dietary = self.full.then(|| {
            let profile = self.resolver.resolve(&composition);
            CatalogLogger::log_dietary_profile(
                product.id,
                profile.allergens.len(),
                profile.vegan,
                profile.vegetarian,
            );
            profile
        });
        CompositionView {
            composition,
            dietary,
        }
    }
}

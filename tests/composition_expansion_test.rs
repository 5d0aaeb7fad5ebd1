// ABOUTME: Tests for composition expansion and product views over an in-memory store
// ABOUTME: Covers order preservation, dangling references, cycles, depth, and batched lookups
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use async_trait::async_trait;
use pasta_catalog::database::{CategoryFilter, ProductFilter};
use pasta_catalog::dietary::{CompositionExpander, CompositionViewBuilder};
use pasta_catalog::errors::AppResult;
use pasta_catalog::models::{Ingredient, IngredientKind, Product};
use pasta_catalog::store::CatalogStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

/// In-memory store counting batched ingredient lookups
#[derive(Default)]
struct MemoryStore {
    ingredients: HashMap<Uuid, Ingredient>,
    products: Vec<Product>,
    lookups: AtomicUsize,
}

impl MemoryStore {
    fn add(&mut self, ingredient: Ingredient) -> Uuid {
        let id = ingredient.id;
        self.ingredients.insert(id, ingredient);
        id
    }

    fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn get_ingredients(&self, ids: &[Uuid]) -> AppResult<Vec<Ingredient>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(ids
            .iter()
            .filter_map(|id| self.ingredients.get(id).cloned())
            .collect())
    }

    async fn get_product(&self, id: Uuid) -> AppResult<Option<Product>> {
        Ok(self.products.iter().find(|p| p.id == id).cloned())
    }

    async fn list_products(&self, filter: &ProductFilter) -> AppResult<Vec<Product>> {
        Ok(self
            .products
            .iter()
            .filter(|p| match filter.category {
                CategoryFilter::Any => true,
                CategoryFilter::Uncategorized => p.category_id.is_none(),
                CategoryFilter::Category(id) => p.category_id == Some(id),
            })
            .cloned()
            .collect())
    }
}

fn simple(name: &str, allergens: &[&str], vegan: bool, vegetarian: bool) -> Ingredient {
    Ingredient::new(name, IngredientKind::Simple)
        .with_allergens(allergens.iter().copied())
        .with_diet(vegan, vegetarian)
}

fn composite(name: &str, subs: &[Uuid]) -> Ingredient {
    Ingredient::new(name, IngredientKind::Compose)
        .with_sub_ingredients(subs.iter().copied())
        .with_diet(true, true)
}

// ============================================================================
// Expansion
// ============================================================================

#[tokio::test]
async fn test_expand_preserves_order_and_nulls_dangling_ids() {
    let mut store = MemoryStore::default();
    let tomates = store.add(simple("Tomates", &[], true, true));
    let basilic = store.add(simple("Basilic", &[], true, true));
    let missing = Uuid::new_v4();

    let expander = CompositionExpander::new(&store, 1);
    let resolved = expander.expand(&[basilic, missing, tomates]).await.unwrap();

    assert_eq!(resolved.len(), 3);
    assert_eq!(resolved[0].as_ref().unwrap().ingredient.name, "Basilic");
    assert!(resolved[1].is_none());
    assert_eq!(resolved[2].as_ref().unwrap().ingredient.name, "Tomates");
}

#[tokio::test]
async fn test_default_depth_populates_one_sub_level() {
    let mut store = MemoryStore::default();
    let farine = store.add(simple("Farine", &["gluten"], true, true));
    let levure = store.add(simple("Levure", &[], true, true));
    let pate = store.add(composite("Pâte", &[farine]));
    let pate_levee = store.add(composite("Pâte levée", &[pate, levure]));

    let expander = CompositionExpander::new(&store, 1);
    assert_eq!(expander.populated_levels(), 1);

    let resolved = expander.expand(&[pate_levee]).await.unwrap();
    let root = resolved[0].as_ref().unwrap();
    assert_eq!(root.sub_ingredients.len(), 2);

    let inner = root.sub_ingredients[0].as_ref().unwrap();
    assert_eq!(inner.ingredient.name, "Pâte");
    assert!(inner.sub_ingredients.is_empty());
}

#[tokio::test]
async fn test_dangling_sub_ingredient_becomes_null() {
    let mut store = MemoryStore::default();
    let farine = store.add(simple("Farine", &["gluten"], true, true));
    let pate = store.add(composite("Pâte", &[Uuid::new_v4(), farine]));

    let resolved = CompositionExpander::new(&store, 1)
        .expand(&[pate])
        .await
        .unwrap();

    let subs = &resolved[0].as_ref().unwrap().sub_ingredients;
    assert_eq!(subs.len(), 2);
    assert!(subs[0].is_none());
    assert_eq!(subs[1].as_ref().unwrap().ingredient.name, "Farine");
}

#[tokio::test]
async fn test_cycle_terminates_and_omits_back_edge() {
    let mut store = MemoryStore::default();
    let a_id = Uuid::new_v4();
    let b_id = Uuid::new_v4();
    let mut a = composite("A", &[b_id]);
    a.id = a_id;
    let mut b = composite("B", &[a_id]);
    b.id = b_id;
    store.add(a);
    store.add(b);

    let resolved = CompositionExpander::new(&store, 4)
        .expand(&[a_id])
        .await
        .unwrap();

    let root = resolved[0].as_ref().unwrap();
    assert_eq!(root.ingredient.name, "A");
    assert_eq!(root.sub_ingredients.len(), 1);
    let child = root.sub_ingredients[0].as_ref().unwrap();
    assert_eq!(child.ingredient.name, "B");
    assert!(child.sub_ingredients.is_empty());
}

#[tokio::test]
async fn test_self_reference_is_not_expanded() {
    let mut store = MemoryStore::default();
    let id = Uuid::new_v4();
    let mut looped = composite("Boucle", &[id]);
    looped.id = id;
    store.add(looped);

    let resolved = CompositionExpander::new(&store, 3)
        .expand(&[id])
        .await
        .unwrap();
    assert!(resolved[0].as_ref().unwrap().sub_ingredients.is_empty());
}

#[tokio::test]
async fn test_expand_all_batches_lookups_per_level() {
    let mut store = MemoryStore::default();
    let farine = store.add(simple("Farine", &["gluten"], true, true));
    let oeufs = store.add(simple("Œufs", &["œufs"], false, true));
    let pate = store.add(composite("Pâte", &[farine, oeufs]));
    let tomates = store.add(simple("Tomates", &[], true, true));

    let first: Vec<Uuid> = vec![pate, tomates];
    let second: Vec<Uuid> = vec![tomates];
    let expander = CompositionExpander::new(&store, 1);
    let resolved = expander
        .expand_all(&[first.as_slice(), second.as_slice()])
        .await
        .unwrap();

    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved[0].len(), 2);
    assert_eq!(resolved[1].len(), 1);
    // One lookup for direct entries, one for the composite's children
    assert_eq!(store.lookups(), 2);
}

// ============================================================================
// Product views
// ============================================================================

#[tokio::test]
async fn test_view_builder_adds_profile_only_when_full() {
    let mut store = MemoryStore::default();
    let pates = store.add(simple("PâtesAuxŒufs", &["gluten", "œufs"], false, true));
    let tomates = store.add(simple("Tomates", &[], true, true));
    let product = Product::new("Lasagnes fraîches", 12.5).with_composition([pates, tomates]);

    let plain = CompositionViewBuilder::new(&store, 1, false)
        .build(&product)
        .await
        .unwrap();
    assert_eq!(plain.composition.len(), 2);
    assert!(plain.dietary.is_none());

    let full = CompositionViewBuilder::new(&store, 1, true)
        .build(&product)
        .await
        .unwrap();
    let profile = full.dietary.unwrap();
    assert_eq!(profile.allergens, vec!["gluten", "œufs"]);
    assert!(!profile.vegan);
    assert!(profile.vegetarian);
}

#[tokio::test]
async fn test_view_builder_depth_two_reaches_sub_ingredients() {
    let mut store = MemoryStore::default();
    let farine = store.add(simple("Farine", &["gluten"], true, true));
    let oeufs = store.add(simple("Œufs", &["œufs"], false, true));
    let pate = store.add(composite("Pâte maison", &[farine, oeufs]));
    let product = Product::new("Tagliatelles", 4.9).with_composition([pate]);

    let shallow = CompositionViewBuilder::new(&store, 1, true)
        .build(&product)
        .await
        .unwrap()
        .dietary
        .unwrap();
    assert!(shallow.allergens.is_empty());
    assert!(shallow.vegan);

    let deep = CompositionViewBuilder::new(&store, 2, true)
        .build(&product)
        .await
        .unwrap()
        .dietary
        .unwrap();
    assert_eq!(deep.allergens, vec!["gluten", "œufs"]);
    assert!(!deep.vegan);
    assert!(deep.vegetarian);
}

#[tokio::test]
async fn test_build_all_keeps_product_order() {
    let mut store = MemoryStore::default();
    let tomates = store.add(simple("Tomates", &[], true, true));
    let beurre = store.add(simple("Beurre", &["lait"], false, true));
    let products = vec![
        Product::new("Sauce tomate", 5.5).with_composition([tomates]),
        Product::new("Sauce beurre", 6.0).with_composition([beurre]),
        Product::new("Vide", 1.0),
    ];
    store.products.clone_from(&products);

    let views = CompositionViewBuilder::new(&store, 1, true)
        .build_all(&products)
        .await
        .unwrap();

    assert_eq!(views.len(), 3);
    assert!(views[0].dietary.as_ref().unwrap().vegan);
    assert_eq!(views[1].dietary.as_ref().unwrap().allergens, vec!["lait"]);
    let empty = views[2].dietary.as_ref().unwrap();
    assert!(!empty.vegan && !empty.vegetarian);

    let listed = store
        .list_products(&ProductFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 3);
}

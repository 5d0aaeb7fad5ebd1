// ABOUTME: Integration tests for the catalog database managers
// ABOUTME: Covers CRUD, name uniqueness, filters, reference clearing, and lenient decoding
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::Utc;
use common::{create_composite_ingredient, create_product, create_simple_ingredient};
use pasta_catalog::database::{
    CategoryFilter, CategoryInput, IngredientFilter, IngredientInput, ProductFilter, ProductInput,
    SupplierInput,
};
use pasta_catalog::errors::{AppError, ErrorCode};
use pasta_catalog::models::IngredientKind;
use uuid::Uuid;

fn category_input(name: &str) -> CategoryInput {
    CategoryInput {
        name: name.to_owned(),
        description: None,
    }
}

fn supplier_input(name: &str) -> SupplierInput {
    SupplierInput {
        name: name.to_owned(),
        contact: Some("Jeanne".to_owned()),
        email: Some("jeanne@moulin.example".to_owned()),
        phone: None,
        address: None,
    }
}

// ============================================================================
// Categories and suppliers
// ============================================================================

#[tokio::test]
async fn test_category_crud_round() {
    let database = common::create_test_database().await.unwrap();
    let categories = database.categories();

    let created = categories.create(&category_input("Sauces")).await.unwrap();
    assert_eq!(
        categories.get(created.id).await.unwrap().unwrap().name,
        "Sauces"
    );

    let updated = categories
        .update(
            created.id,
            &CategoryInput {
                name: "Sauces maison".to_owned(),
                description: Some("En bocal".to_owned()),
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Sauces maison");
    assert_eq!(updated.description.as_deref(), Some("En bocal"));
    assert!(updated.updated_at >= created.updated_at);

    assert!(categories.delete(created.id).await.unwrap());
    assert!(!categories.delete(created.id).await.unwrap());
    assert!(categories.get(created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_category_names_are_unique_case_insensitively() {
    let database = common::create_test_database().await.unwrap();
    let categories = database.categories();
    let sauces = categories.create(&category_input("Sauces")).await.unwrap();

    let error = categories
        .create(&category_input("SAUCES"))
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::InvalidInput);

    // Renaming a record to its own name is not a conflict
    let renamed = categories
        .update(sauces.id, &category_input("sauces"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.name, "sauces");
}

#[tokio::test]
async fn test_update_missing_category_returns_none() {
    let database = common::create_test_database().await.unwrap();
    let result = database
        .categories()
        .update(Uuid::new_v4(), &category_input("Fantôme"))
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_supplier_list_is_sorted_by_name() {
    let database = common::create_test_database().await.unwrap();
    let suppliers = database.suppliers();
    suppliers.create(&supplier_input("ferme du Val")).await.unwrap();
    suppliers.create(&supplier_input("Atelier Rossi")).await.unwrap();
    suppliers.create(&supplier_input("Moulin")).await.unwrap();

    let names: Vec<String> = suppliers
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["Atelier Rossi", "ferme du Val", "Moulin"]);
}

// ============================================================================
// Ingredients
// ============================================================================

#[tokio::test]
async fn test_ingredient_round_trip_keeps_flags_and_order() {
    let database = common::create_test_database().await.unwrap();
    let farine = create_simple_ingredient(&database, "Farine", &["gluten"], true, true)
        .await
        .unwrap();
    let oeufs = create_simple_ingredient(&database, "Œufs", &["œufs"], false, true)
        .await
        .unwrap();
    let pate = create_composite_ingredient(
        &database,
        "Pâte",
        &[oeufs.id, farine.id],
        &["œufs", "gluten"],
        false,
        true,
    )
    .await
    .unwrap();

    let stored = database.ingredients().get(pate.id).await.unwrap().unwrap();
    assert_eq!(stored.kind, IngredientKind::Compose);
    assert_eq!(stored.sub_ingredient_ids, vec![oeufs.id, farine.id]);
    assert_eq!(stored.allergens, vec!["œufs", "gluten"]);
    assert!(!stored.vegan);
    assert!(stored.vegetarian);
    assert!(stored.is_composite());
}

#[tokio::test]
async fn test_get_many_and_find_missing() {
    let database = common::create_test_database().await.unwrap();
    let tomates = create_simple_ingredient(&database, "Tomates", &[], true, true)
        .await
        .unwrap();
    let basilic = create_simple_ingredient(&database, "Basilic", &[], true, true)
        .await
        .unwrap();
    let missing = Uuid::new_v4();

    let found = database
        .ingredients()
        .get_many(&[tomates.id, missing, basilic.id, tomates.id])
        .await
        .unwrap();
    assert_eq!(found.len(), 2);

    let absent = database
        .ingredients()
        .find_missing(&[tomates.id, missing])
        .await
        .unwrap();
    assert_eq!(absent, vec![missing]);

    assert!(database.ingredients().get_many(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ingredient_filters() {
    let database = common::create_test_database().await.unwrap();
    let farine = create_simple_ingredient(&database, "Farine de blé", &["gluten"], true, true)
        .await
        .unwrap();
    create_simple_ingredient(&database, "Farine de riz", &[], true, true)
        .await
        .unwrap();
    create_composite_ingredient(&database, "Pâte brisée", &[farine.id], &["gluten"], true, true)
        .await
        .unwrap();

    let composites = database
        .ingredients()
        .list(&IngredientFilter {
            kind: Some(IngredientKind::Compose),
            query: None,
        })
        .await
        .unwrap();
    assert_eq!(composites.len(), 1);
    assert_eq!(composites[0].name, "Pâte brisée");

    let flours = database
        .ingredients()
        .list(&IngredientFilter {
            kind: None,
            query: Some("FARINE".to_owned()),
        })
        .await
        .unwrap();
    assert_eq!(flours.len(), 2);
}

#[tokio::test]
async fn test_list_allergens_is_sorted_and_distinct() {
    let database = common::create_test_database().await.unwrap();
    create_simple_ingredient(&database, "Œufs", &["œufs"], false, true)
        .await
        .unwrap();
    create_simple_ingredient(&database, "Farine", &["gluten"], true, true)
        .await
        .unwrap();
    create_simple_ingredient(&database, "Pesto", &["lait", "gluten"], false, true)
        .await
        .unwrap();

    let allergens = database.ingredients().list_allergens().await.unwrap();
    assert_eq!(allergens, vec!["gluten", "lait", "œufs"]);
}

#[tokio::test]
async fn test_malformed_stored_documents_are_tolerated() {
    let database = common::create_test_database().await.unwrap();
    let id = Uuid::new_v4();
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        r#"
        INSERT INTO ingredients (id, name, kind, sub_ingredients, allergens, vegan, vegeta,
                                 created_at, updated_at)
        VALUES ($1, 'Ancien', 'compose', '["not-an-id", 42]', '"gluten"', 1, 1, $2, $2)
        "#,
    )
    .bind(id.to_string())
    .bind(&now)
    .execute(database.pool())
    .await
    .unwrap();

    let ingredient = database.ingredients().get(id).await.unwrap().unwrap();
    assert!(ingredient.allergens.is_empty());
    assert!(ingredient.sub_ingredient_ids.is_empty());
    assert!(!ingredient.is_composite());
}

#[tokio::test]
async fn test_clear_supplier_detaches_ingredients() {
    let database = common::create_test_database().await.unwrap();
    let supplier = database
        .suppliers()
        .create(&supplier_input("Moulin"))
        .await
        .unwrap();
    let farine = create_simple_ingredient(&database, "Farine", &["gluten"], true, true)
        .await
        .unwrap();

    let mut input = IngredientInput::from(&farine);
    input.supplier_id = Some(supplier.id);
    let supplied = database
        .ingredients()
        .update(farine.id, &input)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(supplied.supplier_id, Some(supplier.id));

    let cleared = database
        .ingredients()
        .clear_supplier(supplier.id)
        .await
        .unwrap();
    assert_eq!(cleared, 1);
    let stored = database.ingredients().get(farine.id).await.unwrap().unwrap();
    assert!(stored.supplier_id.is_none());
    assert_eq!(stored.allergens, vec!["gluten"]);
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_product_category_filters_and_clearing() {
    let database = common::create_test_database().await.unwrap();
    let sauces = database
        .categories()
        .create(&category_input("Sauces"))
        .await
        .unwrap();

    let input = ProductInput {
        name: "Sauce tomate".to_owned(),
        category_id: Some(sauces.id),
        description: None,
        price: 5.5,
        stock: 4,
        composition: Vec::new(),
        image: None,
    };
    database.products().create(&input).await.unwrap();
    create_product(&database, "Tagliatelles", &[]).await.unwrap();

    let in_category = database
        .products()
        .list(&ProductFilter {
            category: CategoryFilter::Category(sauces.id),
            query: None,
        })
        .await
        .unwrap();
    assert_eq!(in_category.len(), 1);
    assert_eq!(in_category[0].name, "Sauce tomate");

    let uncategorized = database
        .products()
        .list(&ProductFilter {
            category: CategoryFilter::Uncategorized,
            query: None,
        })
        .await
        .unwrap();
    assert_eq!(uncategorized.len(), 1);
    assert_eq!(uncategorized[0].name, "Tagliatelles");

    assert_eq!(
        database.products().clear_category(sauces.id).await.unwrap(),
        1
    );
    let all_uncategorized = database
        .products()
        .list(&ProductFilter {
            category: CategoryFilter::Uncategorized,
            query: None,
        })
        .await
        .unwrap();
    assert_eq!(all_uncategorized.len(), 2);
}

#[tokio::test]
async fn test_product_keeps_dangling_composition_entries() {
    let database = common::create_test_database().await.unwrap();
    let tomates = create_simple_ingredient(&database, "Tomates", &[], true, true)
        .await
        .unwrap();
    let product = create_product(&database, "Sauce", &[tomates.id])
        .await
        .unwrap();

    assert!(database.ingredients().delete(tomates.id).await.unwrap());

    let stored = database.products().get(product.id).await.unwrap().unwrap();
    assert_eq!(stored.composition, vec![tomates.id]);
}

#[tokio::test]
async fn test_product_update_rejects_taken_name() {
    let database = common::create_test_database().await.unwrap();
    create_product(&database, "Lasagnes", &[]).await.unwrap();
    let other = create_product(&database, "Cannelloni", &[]).await.unwrap();

    let mut input = ProductInput::from(&other);
    input.name = "lasagnes".to_owned();
    let error = database
        .products()
        .update(other.id, &input)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::InvalidInput);

    input.name = "Cannelloni".to_owned();
    input.stock = 12;
    let updated = database
        .products()
        .update(other.id, &input)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.stock, 12);
}

#[tokio::test]
async fn test_names_fold_accented_capitals() {
    let database = common::create_test_database().await.unwrap();
    create_simple_ingredient(&database, "Œufs", &["œufs"], false, true)
        .await
        .unwrap();
    create_simple_ingredient(&database, "Crème fraîche", &["lait"], false, true)
        .await
        .unwrap();

    let duplicate = create_simple_ingredient(&database, "œufs", &[], false, true)
        .await
        .unwrap_err();
    let duplicate = duplicate.downcast_ref::<AppError>().unwrap();
    assert_eq!(duplicate.code, ErrorCode::InvalidInput);

    let eggs = database
        .ingredients()
        .list(&IngredientFilter {
            kind: None,
            query: Some("œufs".to_owned()),
        })
        .await
        .unwrap();
    assert_eq!(eggs.len(), 1);
    assert_eq!(eggs[0].name, "Œufs");

    let cream = database
        .ingredients()
        .list(&IngredientFilter {
            kind: None,
            query: Some("CRÈME".to_owned()),
        })
        .await
        .unwrap();
    assert_eq!(cream.len(), 1);

    create_product(&database, "Éclair au café", &[]).await.unwrap();
    let eclairs = database
        .products()
        .list(&ProductFilter {
            category: CategoryFilter::Any,
            query: Some("éclair".to_owned()),
        })
        .await
        .unwrap();
    assert_eq!(eclairs.len(), 1);
}

#[tokio::test]
async fn test_count_image_refs_excludes_owner() {
    let database = common::create_test_database().await.unwrap();
    let mut input = ProductInput {
        name: "Farfalle".to_owned(),
        category_id: None,
        description: None,
        price: 4.5,
        stock: 2,
        composition: Vec::new(),
        image: Some("shared.png".to_owned()),
    };
    let farfalle = database.products().create(&input).await.unwrap();
    input.name = "Orecchiette".to_owned();
    database.products().create(&input).await.unwrap();

    let products = database.products();
    assert_eq!(products.count_image_refs("shared.png", None).await.unwrap(), 2);
    assert_eq!(
        products
            .count_image_refs("shared.png", Some(farfalle.id))
            .await
            .unwrap(),
        1
    );
    assert_eq!(products.count_image_refs("other.png", None).await.unwrap(), 0);
}

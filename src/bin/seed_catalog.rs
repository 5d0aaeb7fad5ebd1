// ABOUTME: Demo catalog seeding utility for the pasta catalog server
// ABOUTME: Creates sample categories, suppliers, ingredients, and products idempotently
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Demo catalog seeder.
//!
//! Records are matched by name, so running the seeder twice leaves the
//! catalog unchanged.
//!
//! Usage:
//! ```bash
//! # Seed the database named by DATABASE_URL
//! cargo run --bin seed-catalog
//!
//! # Override database URL
//! cargo run --bin seed-catalog -- --database-url sqlite:./data/demo.db
//! ```

use anyhow::Result;
use clap::Parser;
use pasta_catalog::{
    config::database::DatabaseUrl,
    constants::{defaults, service_names},
    database::{
        CategoryInput, Database, IngredientFilter, IngredientInput, ProductFilter, ProductInput,
        SupplierInput,
    },
    models::{normalize_allergens, IngredientKind},
};
use std::collections::HashMap;
use std::env;
use tracing::info;
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "seed-catalog",
    about = "Pasta catalog demo data seeder",
    long_about = "Create a small fresh-pasta catalog with composite ingredients for demos"
)]
struct SeedArgs {
    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

struct SeedIngredient {
    name: &'static str,
    supplier: Option<&'static str>,
    allergens: &'static [&'static str],
    vegan: bool,
    vegetarian: bool,
    sub_ingredients: &'static [&'static str],
}

struct SeedProduct {
    name: &'static str,
    category: &'static str,
    description: &'static str,
    price: f64,
    stock: u32,
    composition: &'static [&'static str],
}

const CATEGORIES: &[(&str, &str)] = &[
    ("Pâtes fraîches", "Pâtes préparées chaque matin"),
    ("Sauces", "Sauces maison en bocal"),
    ("Plats préparés", "Plats cuisinés prêts à réchauffer"),
];

const SUPPLIERS: &[(&str, &str)] = &[
    ("Moulin des Coteaux", "Farines de blé tendre et de blé dur"),
    ("Ferme du Val", "Œufs plein air et produits laitiers"),
    ("Maraîcher Lucas", "Légumes et herbes de saison"),
];

// Leaves before the composites that reference them.
const INGREDIENTS: &[SeedIngredient] = &[
    SeedIngredient {
        name: "Farine de blé",
        supplier: Some("Moulin des Coteaux"),
        allergens: &["gluten"],
        vegan: true,
        vegetarian: true,
        sub_ingredients: &[],
    },
    SeedIngredient {
        name: "Œufs frais",
        supplier: Some("Ferme du Val"),
        allergens: &["œufs"],
        vegan: false,
        vegetarian: true,
        sub_ingredients: &[],
    },
    SeedIngredient {
        name: "Tomates",
        supplier: Some("Maraîcher Lucas"),
        allergens: &[],
        vegan: true,
        vegetarian: true,
        sub_ingredients: &[],
    },
    SeedIngredient {
        name: "Basilic",
        supplier: Some("Maraîcher Lucas"),
        allergens: &[],
        vegan: true,
        vegetarian: true,
        sub_ingredients: &[],
    },
    SeedIngredient {
        name: "Parmesan",
        supplier: Some("Ferme du Val"),
        allergens: &["lait"],
        vegan: false,
        vegetarian: false,
        sub_ingredients: &[],
    },
    SeedIngredient {
        name: "Pâtes aux œufs",
        supplier: None,
        allergens: &["gluten", "œufs"],
        vegan: false,
        vegetarian: true,
        sub_ingredients: &["Farine de blé", "Œufs frais"],
    },
];

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Lasagnes fraîches",
        category: "Plats préparés",
        description: "Feuilles de pâtes aux œufs et sauce tomate",
        price: 12.5,
        stock: 8,
        composition: &["Pâtes aux œufs", "Tomates"],
    },
    SeedProduct {
        name: "Tagliatelles aux œufs",
        category: "Pâtes fraîches",
        description: "Rubans de pâte fraîche, 250 g",
        price: 4.9,
        stock: 20,
        composition: &["Pâtes aux œufs"],
    },
    SeedProduct {
        name: "Sauce tomate au basilic",
        category: "Sauces",
        description: "Tomates mijotées et basilic frais",
        price: 5.5,
        stock: 15,
        composition: &["Tomates", "Basilic"],
    },
    SeedProduct {
        name: "Sauce tomate au parmesan",
        category: "Sauces",
        description: "Tomates mijotées relevées de parmesan",
        price: 6.2,
        stock: 10,
        composition: &["Tomates", "Parmesan"],
    },
];

#[tokio::main]
async fn main() -> Result<()> {
    let args = SeedArgs::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(log_level).init();

    info!("=== {} ===", service_names::SEED_CATALOG);

    let database_url = args
        .database_url
        .or_else(|| env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| defaults::DATABASE_URL.to_owned());
    info!("Connecting to database: {database_url}");
    let database = Database::connect(&DatabaseUrl::parse_url(&database_url)?).await?;

    let categories = seed_categories(&database).await?;
    let suppliers = seed_suppliers(&database).await?;
    let ingredients = seed_ingredients(&database, &suppliers).await?;
    let created_products = seed_products(&database, &categories, &ingredients).await?;

    info!("");
    info!("=== Seeding Complete ===");
    info!(
        "{} categories, {} suppliers, {} ingredients, {} new products",
        categories.len(),
        suppliers.len(),
        ingredients.len(),
        created_products
    );

    Ok(())
}

async fn seed_categories(database: &Database) -> Result<HashMap<&'static str, Uuid>> {
    let existing = database.categories().list().await?;
    let mut ids = HashMap::new();
    for (name, description) in CATEGORIES {
        let id = match existing.iter().find(|c| c.name.eq_ignore_ascii_case(name)) {
            Some(category) => category.id,
            None => {
                let input = CategoryInput {
                    name: (*name).to_owned(),
                    description: Some((*description).to_owned()),
                };
                let category = database.categories().create(&input).await?;
                info!("  ✓ category {name}");
                category.id
            }
        };
        ids.insert(*name, id);
    }
    Ok(ids)
}

async fn seed_suppliers(database: &Database) -> Result<HashMap<&'static str, Uuid>> {
    let existing = database.suppliers().list().await?;
    let mut ids = HashMap::new();
    for (name, contact) in SUPPLIERS {
        let id = match existing.iter().find(|s| s.name.eq_ignore_ascii_case(name)) {
            Some(supplier) => supplier.id,
            None => {
                let input = SupplierInput {
                    name: (*name).to_owned(),
                    contact: Some((*contact).to_owned()),
                    email: None,
                    phone: None,
                    address: None,
                };
                let supplier = database.suppliers().create(&input).await?;
                info!("  ✓ supplier {name}");
                supplier.id
            }
        };
        ids.insert(*name, id);
    }
    Ok(ids)
}

async fn seed_ingredients(
    database: &Database,
    suppliers: &HashMap<&'static str, Uuid>,
) -> Result<HashMap<&'static str, Uuid>> {
    let existing = database
        .ingredients()
        .list(&IngredientFilter::default())
        .await?;
    let mut ids: HashMap<&'static str, Uuid> = HashMap::new();
    for seed in INGREDIENTS {
        if let Some(found) = existing.iter().find(|i| i.name == seed.name) {
            ids.insert(seed.name, found.id);
            continue;
        }

        let sub_ingredient_ids: Vec<Uuid> = seed
            .sub_ingredients
            .iter()
            .filter_map(|name| ids.get(name).copied())
            .collect();
        let kind = if sub_ingredient_ids.is_empty() {
            IngredientKind::Simple
        } else {
            IngredientKind::Compose
        };
        let input = IngredientInput {
            name: seed.name.to_owned(),
            kind,
            sub_ingredient_ids,
            allergens: normalize_allergens(seed.allergens.iter().copied()),
            vegan: seed.vegan,
            vegetarian: seed.vegetarian,
            supplier_id: seed.supplier.and_then(|name| suppliers.get(name).copied()),
        };
        let ingredient = database.ingredients().create(&input).await?;
        info!("  ✓ ingredient {} ({})", seed.name, kind.as_str());
        ids.insert(seed.name, ingredient.id);
    }
    Ok(ids)
}

async fn seed_products(
    database: &Database,
    categories: &HashMap<&'static str, Uuid>,
    ingredients: &HashMap<&'static str, Uuid>,
) -> Result<usize> {
    let existing = database.products().list(&ProductFilter::default()).await?;
    let mut created = 0;
    for seed in PRODUCTS {
        if existing.iter().any(|p| p.name == seed.name) {
            continue;
        }
        let input = ProductInput {
            name: seed.name.to_owned(),
            category_id: categories.get(seed.category).copied(),
            description: Some(seed.description.to_owned()),
            price: seed.price,
            stock: seed.stock,
            composition: seed
                .composition
                .iter()
                .filter_map(|name| ingredients.get(name).copied())
                .collect(),
            image: None,
        };
        database.products().create(&input).await?;
        info!("  ✓ product {}", seed.name);
        created += 1;
    }
    Ok(created)
}

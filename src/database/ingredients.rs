// ABOUTME: Database operations for ingredients and their composition documents
// ABOUTME: CRUD, batch lookup for composition expansion, and the allergen catalog
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{
    encode_id_list, name_matches, name_taken, parse_stored_id_list, parse_stored_reference,
    parse_stored_timestamp, parse_stored_uuid,
};
use crate::errors::{AppError, AppResult};
use crate::models::{allergens_from_value, Ingredient, IngredientKind};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};
use std::collections::{BTreeSet, HashSet};
use tracing::warn;
use uuid::Uuid;

const INGREDIENT_COLUMNS: &str =
    "id, name, kind, sub_ingredients, allergens, vegan, vegeta, supplier_id, created_at, updated_at";

/// Validated fields of an ingredient write
#[derive(Debug, Clone)]
pub struct IngredientInput {
    /// Display name
    pub name: String,
    /// Leaf or composite
    pub kind: IngredientKind,
    /// Ordered sub-ingredient references
    pub sub_ingredient_ids: Vec<Uuid>,
    /// Declared allergens, already normalized
    pub allergens: Vec<String>,
    /// Vegan flag
    pub vegan: bool,
    /// Vegetarian flag
    pub vegetarian: bool,
    /// Optional supplier reference
    pub supplier_id: Option<Uuid>,
}

impl From<&Ingredient> for IngredientInput {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            name: ingredient.name.clone(),
            kind: ingredient.kind,
            sub_ingredient_ids: ingredient.sub_ingredient_ids.clone(),
            allergens: ingredient.allergens.clone(),
            vegan: ingredient.vegan,
            vegetarian: ingredient.vegetarian,
            supplier_id: ingredient.supplier_id,
        }
    }
}

/// Filter for listing ingredients
#[derive(Debug, Clone, Default)]
pub struct IngredientFilter {
    /// Restrict to one kind
    pub kind: Option<IngredientKind>,
    /// Case-insensitive substring of the name, folded with Unicode lowercase
    pub query: Option<String>,
}

/// Ingredient collection manager
pub struct IngredientsManager {
    pool: SqlitePool,
}

impl IngredientsManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create an ingredient
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken or the database operation fails
    pub async fn create(&self, input: &IngredientInput) -> AppResult<Ingredient> {
        self.ensure_name_available(&input.name, None).await?;

        let now = Utc::now();
        let id = Uuid::new_v4();
        sqlx::query(
            r"
            INSERT INTO ingredients (
                id, name, kind, sub_ingredients, allergens, vegan, vegeta, supplier_id,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            ",
        )
        .bind(id.to_string())
        .bind(&input.name)
        .bind(input.kind.as_str())
        .bind(encode_id_list(&input.sub_ingredient_ids)?)
        .bind(serde_json::to_string(&input.allergens)?)
        .bind(input.vegan)
        .bind(input.vegetarian)
        .bind(input.supplier_id.map(|s| s.to_string()))
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create ingredient: {e}")))?;

        Ok(Ingredient {
            id,
            name: input.name.clone(),
            kind: input.kind,
            sub_ingredient_ids: input.sub_ingredient_ids.clone(),
            allergens: input.allergens.clone(),
            vegan: input.vegan,
            vegetarian: input.vegetarian,
            supplier_id: input.supplier_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get an ingredient by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get(&self, id: Uuid) -> AppResult<Option<Ingredient>> {
        let row = sqlx::query(&format!(
            "SELECT {INGREDIENT_COLUMNS} FROM ingredients WHERE id = $1"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get ingredient: {e}")))?;

        row.map(|r| row_to_ingredient(&r)).transpose()
    }

    /// Get every ingredient whose ID is in `ids`
    ///
    /// Missing IDs are simply absent from the result; order is unspecified.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get_many(&self, ids: &[Uuid]) -> AppResult<Vec<Ingredient>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let unique: HashSet<Uuid> = ids.iter().copied().collect();
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {INGREDIENT_COLUMNS} FROM ingredients WHERE id IN ("
        ));
        let mut separated = builder.separated(", ");
        for id in &unique {
            separated.push_bind(id.to_string());
        }
        separated.push_unseparated(")");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get ingredients: {e}")))?;

        rows.iter().map(row_to_ingredient).collect()
    }

    /// Return the IDs from `ids` that do not exist, in input order
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn find_missing(&self, ids: &[Uuid]) -> AppResult<Vec<Uuid>> {
        let found: HashSet<Uuid> = self
            .get_many(ids)
            .await?
            .into_iter()
            .map(|ingredient| ingredient.id)
            .collect();
        Ok(ids.iter().copied().filter(|id| !found.contains(id)).collect())
    }

    /// List ingredients ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list(&self, filter: &IngredientFilter) -> AppResult<Vec<Ingredient>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {INGREDIENT_COLUMNS} FROM ingredients WHERE 1 = 1"
        ));
        if let Some(kind) = filter.kind {
            builder.push(" AND kind = ").push_bind(kind.as_str());
        }
        builder.push(" ORDER BY name COLLATE NOCASE");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list ingredients: {e}")))?;

        let mut records: Vec<Ingredient> = rows.iter().map(row_to_ingredient).collect::<AppResult<_>>()?;
        if let Some(query) = filter.query.as_deref().filter(|q| !q.trim().is_empty()) {
            records.retain(|record| name_matches(&record.name, query));
        }
        Ok(records)
    }

    /// Replace an ingredient's fields
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken by another ingredient or the
    /// database operation fails
    pub async fn update(&self, id: Uuid, input: &IngredientInput) -> AppResult<Option<Ingredient>> {
        self.ensure_name_available(&input.name, Some(id)).await?;

        let result = sqlx::query(
            r"
            UPDATE ingredients
            SET name = $1, kind = $2, sub_ingredients = $3, allergens = $4, vegan = $5,
                vegeta = $6, supplier_id = $7, updated_at = $8
            WHERE id = $9
            ",
        )
        .bind(&input.name)
        .bind(input.kind.as_str())
        .bind(encode_id_list(&input.sub_ingredient_ids)?)
        .bind(serde_json::to_string(&input.allergens)?)
        .bind(input.vegan)
        .bind(input.vegetarian)
        .bind(input.supplier_id.map(|s| s.to_string()))
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update ingredient: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Delete an ingredient
    ///
    /// References from products and composite ingredients are left in place
    /// and resolve to nothing afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM ingredients WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete ingredient: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Unset the supplier of every ingredient supplied by `supplier_id`
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn clear_supplier(&self, supplier_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE ingredients SET supplier_id = NULL, updated_at = $1 WHERE supplier_id = $2",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(supplier_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to clear ingredient supplier: {e}")))?;

        Ok(result.rows_affected())
    }

    /// Distinct allergens declared across all ingredients, sorted
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list_allergens(&self) -> AppResult<Vec<String>> {
        let documents: Vec<String> = sqlx::query_scalar("SELECT allergens FROM ingredients")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list allergens: {e}")))?;

        let allergens: BTreeSet<String> = documents
            .iter()
            .flat_map(|document| decode_allergens(document))
            .collect();
        Ok(allergens.into_iter().collect())
    }

    async fn ensure_name_available(&self, name: &str, exclude: Option<Uuid>) -> AppResult<()> {
        if name_taken(&self.pool, "ingredients", name, exclude).await? {
            return Err(AppError::invalid_input(format!(
                "An ingredient named '{name}' already exists"
            )));
        }
        Ok(())
    }
}

/// Allergen documents written by older tooling may not be arrays
fn decode_allergens(document: &str) -> Vec<String> {
    serde_json::from_str(document).map_or_else(
        |e| {
            warn!("Ignoring malformed allergen document: {e}");
            Vec::new()
        },
        |value| allergens_from_value(&value),
    )
}

fn row_to_ingredient(row: &SqliteRow) -> AppResult<Ingredient> {
    let id: String = row.get("id");
    let kind: String = row.get("kind");
    let sub_ingredients: String = row.get("sub_ingredients");
    let allergens: String = row.get("allergens");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Ingredient {
        id: parse_stored_uuid(&id)?,
        name: row.get("name"),
        kind: IngredientKind::parse(&kind).unwrap_or_default(),
        sub_ingredient_ids: parse_stored_id_list(&sub_ingredients, "sub_ingredients"),
        allergens: decode_allergens(&allergens),
        vegan: row.get("vegan"),
        vegetarian: row.get("vegeta"),
        supplier_id: parse_stored_reference(row.get("supplier_id"), "supplier_id"),
        created_at: parse_stored_timestamp(&created_at)?,
        updated_at: parse_stored_timestamp(&updated_at)?,
    })
}

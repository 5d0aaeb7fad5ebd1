// ABOUTME: Database operations for products and their ordered ingredient composition
// ABOUTME: CRUD with category and name filters, plus category detachment on category delete
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{
    encode_id_list, name_matches, name_taken, parse_stored_id_list, parse_stored_reference,
    parse_stored_timestamp, parse_stored_uuid,
};
use crate::errors::{AppError, AppResult};
use crate::models::Product;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};
use uuid::Uuid;

const PRODUCT_COLUMNS: &str =
    "id, name, category_id, description, price, stock, composition, image, created_at, updated_at";

/// Validated fields of a product write
#[derive(Debug, Clone)]
pub struct ProductInput {
    /// Display name
    pub name: String,
    /// Optional category reference
    pub category_id: Option<Uuid>,
    /// Optional description
    pub description: Option<String>,
    /// Unit price
    pub price: f64,
    /// Units in stock
    pub stock: u32,
    /// Ordered ingredient references
    pub composition: Vec<Uuid>,
    /// Stored image file name
    pub image: Option<String>,
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category_id: product.category_id,
            description: product.description.clone(),
            price: product.price,
            stock: product.stock,
            composition: product.composition.clone(),
            image: product.image.clone(),
        }
    }
}

/// Category restriction when listing products
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Every product
    #[default]
    Any,
    /// Products without a category reference
    Uncategorized,
    /// Products referencing one category
    Category(Uuid),
}

/// Filter for listing products
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Category restriction
    pub category: CategoryFilter,
    /// Case-insensitive substring of the name, folded with Unicode lowercase
    pub query: Option<String>,
}

/// Product collection manager
pub struct ProductsManager {
    pool: SqlitePool,
}

impl ProductsManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a product
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken or the database operation fails
    pub async fn create(&self, input: &ProductInput) -> AppResult<Product> {
        self.ensure_name_available(&input.name, None).await?;

        let now = Utc::now();
        let id = Uuid::new_v4();
        sqlx::query(
            r"
            INSERT INTO products (
                id, name, category_id, description, price, stock, composition, image,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            ",
        )
        .bind(id.to_string())
        .bind(&input.name)
        .bind(input.category_id.map(|c| c.to_string()))
        .bind(&input.description)
        .bind(input.price)
        .bind(i64::from(input.stock))
        .bind(encode_id_list(&input.composition)?)
        .bind(&input.image)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create product: {e}")))?;

        Ok(Product {
            id,
            name: input.name.clone(),
            category_id: input.category_id,
            description: input.description.clone(),
            price: input.price,
            stock: input.stock,
            composition: input.composition.clone(),
            image: input.image.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a product by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get(&self, id: Uuid) -> AppResult<Option<Product>> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get product: {e}")))?;

        row.map(|r| row_to_product(&r)).transpose()
    }

    /// List products ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list(&self, filter: &ProductFilter) -> AppResult<Vec<Product>> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE 1 = 1"));
        match filter.category {
            CategoryFilter::Any => {}
            CategoryFilter::Uncategorized => {
                builder.push(" AND category_id IS NULL");
            }
            CategoryFilter::Category(category_id) => {
                builder
                    .push(" AND category_id = ")
                    .push_bind(category_id.to_string());
            }
        }
        builder.push(" ORDER BY name COLLATE NOCASE");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list products: {e}")))?;

        let mut records: Vec<Product> = rows.iter().map(row_to_product).collect::<AppResult<_>>()?;
        if let Some(query) = filter.query.as_deref().filter(|q| !q.trim().is_empty()) {
            records.retain(|record| name_matches(&record.name, query));
        }
        Ok(records)
    }

    /// Replace a product's fields
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken by another product or the
    /// database operation fails
    pub async fn update(&self, id: Uuid, input: &ProductInput) -> AppResult<Option<Product>> {
        self.ensure_name_available(&input.name, Some(id)).await?;

        let result = sqlx::query(
            r"
            UPDATE products
            SET name = $1, category_id = $2, description = $3, price = $4, stock = $5,
                composition = $6, image = $7, updated_at = $8
            WHERE id = $9
            ",
        )
        .bind(&input.name)
        .bind(input.category_id.map(|c| c.to_string()))
        .bind(&input.description)
        .bind(input.price)
        .bind(i64::from(input.stock))
        .bind(encode_id_list(&input.composition)?)
        .bind(&input.image)
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update product: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Delete a product
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete product: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    /// Count products other than `exclude` whose image is `name`
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn count_image_refs(&self, name: &str, exclude: Option<Uuid>) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE image = $1 AND ($2 IS NULL OR id != $2)",
        )
        .bind(name)
        .bind(exclude.map(|id| id.to_string()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count image references: {e}")))
    }

    /// Unset the category of every product in `category_id`
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn clear_category(&self, category_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE products SET category_id = NULL, updated_at = $1 WHERE category_id = $2",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(category_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to clear product category: {e}")))?;

        Ok(result.rows_affected())
    }

    async fn ensure_name_available(&self, name: &str, exclude: Option<Uuid>) -> AppResult<()> {
        if name_taken(&self.pool, "products", name, exclude).await? {
            return Err(AppError::invalid_input(format!(
                "A product named '{name}' already exists"
            )));
        }
        Ok(())
    }
}

fn row_to_product(row: &SqliteRow) -> AppResult<Product> {
    let id: String = row.get("id");
    let composition: String = row.get("composition");
    let stock: i64 = row.get("stock");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Product {
        id: parse_stored_uuid(&id)?,
        name: row.get("name"),
        category_id: parse_stored_reference(row.get("category_id"), "category_id"),
        description: row.get("description"),
        price: row.get("price"),
        stock: u32::try_from(stock.max(0)).unwrap_or(u32::MAX),
        composition: parse_stored_id_list(&composition, "composition"),
        image: row.get("image"),
        created_at: parse_stored_timestamp(&created_at)?,
        updated_at: parse_stored_timestamp(&updated_at)?,
    })
}

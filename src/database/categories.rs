// ABOUTME: Database operations for product categories
// ABOUTME: CRUD with case-insensitive name uniqueness
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{name_taken, parse_stored_timestamp, parse_stored_uuid};
use crate::errors::{AppError, AppResult};
use crate::models::Category;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Validated fields of a category write
#[derive(Debug, Clone)]
pub struct CategoryInput {
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
}

/// Category collection manager
pub struct CategoriesManager {
    pool: SqlitePool,
}

impl CategoriesManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a category
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken or the database operation fails
    pub async fn create(&self, input: &CategoryInput) -> AppResult<Category> {
        self.ensure_name_available(&input.name, None).await?;

        let now = Utc::now();
        let id = Uuid::new_v4();
        sqlx::query(
            r"
            INSERT INTO categories (id, name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ",
        )
        .bind(id.to_string())
        .bind(&input.name)
        .bind(&input.description)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create category: {e}")))?;

        Ok(Category {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a category by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get(&self, id: Uuid) -> AppResult<Option<Category>> {
        let row = sqlx::query(
            "SELECT id, name, description, created_at, updated_at FROM categories WHERE id = $1",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get category: {e}")))?;

        row.map(|r| row_to_category(&r)).transpose()
    }

    /// List all categories ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, description, created_at, updated_at
            FROM categories
            ORDER BY name COLLATE NOCASE
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list categories: {e}")))?;

        rows.iter().map(row_to_category).collect()
    }

    /// Replace a category's fields
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken by another category or the
    /// database operation fails
    pub async fn update(&self, id: Uuid, input: &CategoryInput) -> AppResult<Option<Category>> {
        self.ensure_name_available(&input.name, Some(id)).await?;

        let result = sqlx::query(
            r"
            UPDATE categories SET name = $1, description = $2, updated_at = $3
            WHERE id = $4
            ",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update category: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Delete a category
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete category: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn ensure_name_available(&self, name: &str, exclude: Option<Uuid>) -> AppResult<()> {
        if name_taken(&self.pool, "categories", name, exclude).await? {
            return Err(AppError::invalid_input(format!(
                "A category named '{name}' already exists"
            )));
        }
        Ok(())
    }
}

fn row_to_category(row: &SqliteRow) -> AppResult<Category> {
    let id: String = row.get("id");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Category {
        id: parse_stored_uuid(&id)?,
        name: row.get("name"),
        description: row.get("description"),
        created_at: parse_stored_timestamp(&created_at)?,
        updated_at: parse_stored_timestamp(&updated_at)?,
    })
}

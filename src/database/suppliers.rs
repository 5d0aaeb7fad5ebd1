// ABOUTME: Database operations for ingredient suppliers
// ABOUTME: CRUD with case-insensitive name uniqueness and optional contact details
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{name_taken, parse_stored_timestamp, parse_stored_uuid};
use crate::errors::{AppError, AppResult};
use crate::models::Supplier;
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

/// Validated fields of a supplier write
#[derive(Debug, Clone)]
pub struct SupplierInput {
    /// Display name
    pub name: String,
    /// Contact person
    pub contact: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Contact phone number
    pub phone: Option<String>,
    /// Postal address
    pub address: Option<String>,
}

/// Supplier collection manager
pub struct SuppliersManager {
    pool: SqlitePool,
}

impl SuppliersManager {
    /// Create a new manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a supplier
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken or the database operation fails
    pub async fn create(&self, input: &SupplierInput) -> AppResult<Supplier> {
        self.ensure_name_available(&input.name, None).await?;

        let now = Utc::now();
        let id = Uuid::new_v4();
        sqlx::query(
            r"
            INSERT INTO suppliers (id, name, contact, email, phone, address, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            ",
        )
        .bind(id.to_string())
        .bind(&input.name)
        .bind(&input.contact)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(now.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create supplier: {e}")))?;

        Ok(Supplier {
            id,
            name: input.name.clone(),
            contact: input.contact.clone(),
            email: input.email.clone(),
            phone: input.phone.clone(),
            address: input.address.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a supplier by ID
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn get(&self, id: Uuid) -> AppResult<Option<Supplier>> {
        let row = sqlx::query(
            r"
            SELECT id, name, contact, email, phone, address, created_at, updated_at
            FROM suppliers WHERE id = $1
            ",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to get supplier: {e}")))?;

        row.map(|r| row_to_supplier(&r)).transpose()
    }

    /// List all suppliers ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn list(&self) -> AppResult<Vec<Supplier>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, contact, email, phone, address, created_at, updated_at
            FROM suppliers
            ORDER BY name COLLATE NOCASE
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list suppliers: {e}")))?;

        rows.iter().map(row_to_supplier).collect()
    }

    /// Replace a supplier's fields
    ///
    /// # Errors
    ///
    /// Returns an error if the name is taken by another supplier or the
    /// database operation fails
    pub async fn update(&self, id: Uuid, input: &SupplierInput) -> AppResult<Option<Supplier>> {
        self.ensure_name_available(&input.name, Some(id)).await?;

        let result = sqlx::query(
            r"
            UPDATE suppliers
            SET name = $1, contact = $2, email = $3, phone = $4, address = $5, updated_at = $6
            WHERE id = $7
            ",
        )
        .bind(&input.name)
        .bind(&input.contact)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to update supplier: {e}")))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Delete a supplier
    ///
    /// # Errors
    ///
    /// Returns an error if database operation fails
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to delete supplier: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn ensure_name_available(&self, name: &str, exclude: Option<Uuid>) -> AppResult<()> {
        if name_taken(&self.pool, "suppliers", name, exclude).await? {
            return Err(AppError::invalid_input(format!(
                "A supplier named '{name}' already exists"
            )));
        }
        Ok(())
    }
}

fn row_to_supplier(row: &SqliteRow) -> AppResult<Supplier> {
    let id: String = row.get("id");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Supplier {
        id: parse_stored_uuid(&id)?,
        name: row.get("name"),
        contact: row.get("contact"),
        email: row.get("email"),
        phone: row.get("phone"),
        address: row.get("address"),
        created_at: parse_stored_timestamp(&created_at)?,
        updated_at: parse_stored_timestamp(&updated_at)?,
    })
}

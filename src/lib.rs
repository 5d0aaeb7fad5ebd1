// ABOUTME: Main library entry point for the pasta catalog server
// ABOUTME: REST catalog of products, ingredients, categories, and suppliers with dietary profiles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Pasta Catalog Server
//!
//! Catalog backend for an artisanal fresh-pasta business. It stores
//! categories, suppliers, ingredients and products in `SQLite` and serves
//! them over a JSON REST API.
//!
//! ## Dietary profiles
//!
//! Products reference ingredients; composite ingredients reference
//! sub-ingredients. On `?view=full` reads the server derives each product's
//! allergen list and vegan/vegetarian flags from its composition:
//!
//! - [`dietary::expansion`] resolves the composition ids into ingredient
//!   records, guarding against cycles and dangling references
//! - [`dietary::resolver`] folds the resolved records into a
//!   [`dietary::DietaryProfile`]
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pasta_catalog::config::environment::ServerConfig;
//! use pasta_catalog::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Catalog configured on port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Configuration loaded from the environment
pub mod config;

/// Application constants (re-exported from `pasta-core`)
pub mod constants;

/// `SQLite` document store and per-collection managers
pub mod database;

/// Dietary profile derivation over the composition graph
pub mod dietary;

/// Unified error handling (re-exported from `pasta-core`)
pub mod errors;

/// Catalog change notifications
pub mod events;

/// Product image storage on disk
pub mod images;

/// Structured logging setup
pub mod logging;

/// HTTP middleware
pub mod middleware;

/// Catalog records (re-exported from `pasta-core`)
pub mod models;

/// Shared server state handed to every router
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// Router assembly and server startup
pub mod server;

/// Read interface used by the composition expander
pub mod store;

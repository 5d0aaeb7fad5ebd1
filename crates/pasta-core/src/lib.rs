// ABOUTME: Core crate for the pasta catalog server with shared types and constants
// ABOUTME: Foundation layer holding error types, catalog records, and configuration defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Pasta Core
//!
//! Types shared by the catalog server and its tooling:
//!
//! - [`errors`]: `AppError`, `ErrorCode` and the `AppResult` alias
//! - [`models`]: catalog records (ingredients, products, categories, suppliers)
//! - [`constants`]: service names, defaults and fallback display labels

/// Unified error handling
pub mod errors;

/// Catalog records
pub mod models;

/// Application constants
pub mod constants;

// ABOUTME: Catalog records re-exported from the core crate
// ABOUTME: Ingredients, products, categories, and suppliers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use pasta_core::models::*;

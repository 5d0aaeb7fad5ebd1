// ABOUTME: HTTP middleware for the catalog server
// ABOUTME: CORS configuration for the single-page client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// CORS layer setup
pub mod cors;

pub use cors::setup_cors;

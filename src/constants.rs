// ABOUTME: Application constants re-exported from the core crate
// ABOUTME: Service names, defaults, limits, and fallback labels
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use pasta_core::constants::*;

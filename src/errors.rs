// ABOUTME: Unified error types re-exported from the core crate
// ABOUTME: AppError, ErrorCode, ErrorResponse, and the AppResult alias
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use pasta_core::errors::{AppError, AppResult, ErrorCode, ErrorResponse};

// ABOUTME: Configuration module for the pasta catalog server
// ABOUTME: Environment-driven server, database, image, and composition settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration is read from environment variables only.

/// Database location parsing
pub mod database;

/// Server configuration loaded from the environment
pub mod environment;

// ABOUTME: Application constants for the pasta catalog server
// ABOUTME: Service names, configuration defaults, limits, and fallback display labels
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Application constants grouped by concern

/// Service identifiers used in logs and health responses
pub mod service_names {
    /// HTTP server binary
    pub const PASTA_CATALOG_SERVER: &str = "pasta-catalog-server";
    /// Demo data seeder binary
    pub const SEED_CATALOG: &str = "seed-catalog";
}

/// Display labels for records whose optional reference is unset or dangling
pub mod labels {
    /// Shown for a product without a resolvable category
    pub const UNCATEGORIZED: &str = "Sans catégorie";
    /// Shown for an ingredient without a resolvable supplier
    pub const NO_SUPPLIER: &str = "Sans fournisseur";
}

/// Defaults applied when an environment variable is not set
pub mod defaults {
    /// HTTP listen port
    pub const HTTP_PORT: u16 = 8081;
    /// HTTP bind address
    pub const HOST: &str = "127.0.0.1";
    /// Document store location
    pub const DATABASE_URL: &str = "sqlite:./data/catalog.db";
    /// Directory holding uploaded product images
    pub const UPLOAD_DIR: &str = "./data/images";
    /// Allowed CORS origins
    pub const CORS_ALLOWED_ORIGINS: &str = "*";
    /// Number of ingredient levels aggregated into a dietary profile
    pub const MAX_EXPANSION_DEPTH: usize = 1;
    /// Catalog event bus buffer
    pub const EVENT_CHANNEL_CAPACITY: usize = 64;
    /// Largest accepted image upload (5 MiB)
    pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
}

/// Hard limits enforced on configuration and input
pub mod limits {
    /// Upper bound for `MAX_EXPANSION_DEPTH`
    pub const MAX_EXPANSION_DEPTH_LIMIT: usize = 8;
    /// Longest accepted name for any catalog record
    pub const MAX_NAME_LENGTH: usize = 200;
    /// Longest accepted free text field
    pub const MAX_DESCRIPTION_LENGTH: usize = 4000;
}

/// API metadata
pub mod api {
    /// Version reported in list response metadata
    pub const API_VERSION: &str = "1.0";
}

// ABOUTME: Shared server state handed to every router
// ABOUTME: Owns the database handle, image store, event bus, and configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::config::environment::ServerConfig;
use crate::database::Database;
use crate::events::CatalogEvents;
use crate::images::ImageStore;
use std::sync::Arc;

/// Resources shared by all request handlers
pub struct ServerResources {
    /// Catalog database
    pub database: Arc<Database>,
    /// Product image storage
    pub images: ImageStore,
    /// Catalog change notifications
    pub events: CatalogEvents,
    /// Server configuration
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Assemble resources from a connected database and configuration
    #[must_use]
    pub fn new(database: Arc<Database>, config: Arc<ServerConfig>) -> Self {
        Self {
            images: ImageStore::new(config.images.upload_dir.clone(), config.images.max_bytes),
            events: CatalogEvents::new(config.events.channel_capacity),
            database,
            config,
        }
    }

    /// Ingredient levels folded into dietary profiles
    #[must_use]
    pub fn max_expansion_depth(&self) -> usize {
        self.config.catalog.max_expansion_depth
    }
}

// ABOUTME: Catalog change notifications published after successful writes
// ABOUTME: Broadcast bus owned by the server resources and streamed to clients over SSE
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Catalog Events
//!
//! Every mutating handler publishes a [`CatalogEvent`] once its write has
//! succeeded. Clients subscribe through `GET /api/events` and refresh the
//! affected lists. Publishing never fails: with no subscriber the event is
//! dropped.

use crate::logging::CatalogLogger;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Collection touched by a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogCollection {
    /// Product categories
    Categories,
    /// Ingredient suppliers
    Suppliers,
    /// Ingredients
    Ingredients,
    /// Products
    Products,
    /// Uploaded images
    Images,
}

impl CatalogCollection {
    /// Wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::Suppliers => "suppliers",
            Self::Ingredients => "ingredients",
            Self::Products => "products",
            Self::Images => "images",
        }
    }
}

/// Kind of mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogAction {
    /// Record created
    Created,
    /// Record replaced
    Updated,
    /// Record removed
    Deleted,
}

impl CatalogAction {
    /// Wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

/// A committed catalog mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEvent {
    /// Affected collection
    pub collection: CatalogCollection,
    /// What happened
    pub action: CatalogAction,
    /// Record identifier (image file name for images)
    pub id: String,
    /// When the event was published
    pub timestamp: DateTime<Utc>,
}

impl CatalogEvent {
    /// Create an event stamped now
    #[must_use]
    pub fn new(collection: CatalogCollection, action: CatalogAction, id: impl ToString) -> Self {
        Self {
            collection,
            action,
            id: id.to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Broadcast bus for catalog events
#[derive(Debug, Clone)]
pub struct CatalogEvents {
    sender: broadcast::Sender<CatalogEvent>,
}

impl CatalogEvents {
    /// Create a bus buffering `capacity` events per subscriber
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event, returning how many subscribers received it
    pub fn publish(&self, event: CatalogEvent) -> usize {
        CatalogLogger::log_mutation(event.collection.as_str(), event.action.as_str(), &event.id);
        self.sender.send(event).unwrap_or_else(|_| {
            debug!("Catalog event dropped: no subscribers");
            0
        })
    }

    /// Publish a mutation of `collection`
    pub fn notify(
        &self,
        collection: CatalogCollection,
        action: CatalogAction,
        id: impl ToString,
    ) -> usize {
        self.publish(CatalogEvent::new(collection, action, id))
    }

    /// Subscribe to future events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

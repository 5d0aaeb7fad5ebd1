// ABOUTME: Route handlers for product image upload, download, and deletion
// ABOUTME: Accepts raw image bodies and serves stored files with their content type
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::AppError;
use crate::events::{CatalogAction, CatalogCollection};
use crate::resources::ServerResources;
use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Response for a stored upload
#[derive(Debug, Serialize, Deserialize)]
pub struct ImageUploadResponse {
    /// Generated file name, to be set as a product's `image`
    pub filename: String,
    /// URL serving the file
    pub url: String,
}

/// Images routes handler
pub struct ImagesRoutes;

impl ImagesRoutes {
    /// Create all image routes
    ///
    /// The body limit sits one byte above the configured maximum so that
    /// oversized uploads reach the store and get a proper error body.
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        let body_limit = resources.images.max_bytes().saturating_add(1);
        Router::new()
            .route("/api/images", post(Self::handle_upload))
            .route(
                "/api/images/:filename",
                get(Self::handle_download).delete(Self::handle_delete),
            )
            .layer(DefaultBodyLimit::max(body_limit))
            .with_state(resources)
    }

    /// Handle POST /api/images - Store a raw image body
    async fn handle_upload(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Response, AppError> {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::missing_field("Content-Type"))?;

        let filename = resources.images.save(content_type, &body).await?;

        resources.events.notify(
            CatalogCollection::Images,
            CatalogAction::Created,
            &filename,
        );
        let response = ImageUploadResponse {
            url: format!("/api/images/{filename}"),
            filename,
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/images/:filename - Serve a stored image
    async fn handle_download(
        State(resources): State<Arc<ServerResources>>,
        Path(filename): Path<String>,
    ) -> Result<Response, AppError> {
        let (format, bytes) = resources.images.read(&filename).await?;
        Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, format.content_type())],
            bytes,
        )
            .into_response())
    }

    /// Handle DELETE /api/images/:filename - Remove a stored image
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        Path(filename): Path<String>,
    ) -> Result<Response, AppError> {
        resources.images.delete(&filename).await?;

        resources.events.notify(
            CatalogCollection::Images,
            CatalogAction::Deleted,
            &filename,
        );
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }
}

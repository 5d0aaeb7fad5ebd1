// ABOUTME: Product image storage in a flat upload directory
// ABOUTME: Validates content types and file names, writes uploads under generated names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::{AppError, AppResult};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;
use uuid::Uuid;

/// Accepted image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// `image/png`
    Png,
    /// `image/jpeg`
    Jpeg,
    /// `image/webp`
    Webp,
    /// `image/gif`
    Gif,
}

impl ImageFormat {
    /// Match a `Content-Type` header value, ignoring parameters
    #[must_use]
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type.split(';').next().unwrap_or_default().trim();
        match mime.to_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::Webp),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Match a file extension
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Extension used for stored files
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
            Self::Gif => "gif",
        }
    }

    /// `Content-Type` served for stored files
    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
        }
    }
}

/// Directory-backed image store
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    max_bytes: usize,
}

impl ImageStore {
    /// Create a store rooted at `dir`
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    /// Upload directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Largest accepted upload
    #[must_use]
    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Create the upload directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created
    pub async fn ensure_dir(&self) -> AppResult<()> {
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppError::storage(format!(
                "Failed to create upload directory {}: {e}",
                self.dir.display()
            ))
        })
    }

    /// Store an upload under a generated name and return that name
    ///
    /// # Errors
    ///
    /// Returns an error if the content type is not an accepted image type,
    /// the body is empty or too large, or the write fails
    pub async fn save(&self, content_type: &str, bytes: &[u8]) -> AppResult<String> {
        let format = ImageFormat::from_content_type(content_type).ok_or_else(|| {
            AppError::invalid_format(format!("Unsupported image content type '{content_type}'"))
        })?;
        if bytes.is_empty() {
            return Err(AppError::invalid_input("Image body is empty"));
        }
        if bytes.len() > self.max_bytes {
            return Err(AppError::payload_too_large(self.max_bytes));
        }

        self.ensure_dir().await?;
        let filename = format!("{}.{}", Uuid::new_v4(), format.extension());
        fs::write(self.dir.join(&filename), bytes)
            .await
            .map_err(|e| AppError::storage(format!("Failed to write image {filename}: {e}")))?;

        info!(image.name = %filename, image.bytes = bytes.len(), "Image stored");
        Ok(filename)
    }

    /// Read a stored image
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid, the file does not exist or
    /// cannot be read
    pub async fn read(&self, name: &str) -> AppResult<(ImageFormat, Vec<u8>)> {
        let format = Self::validate_name(name)?;
        let bytes = fs::read(self.dir.join(name))
            .await
            .map_err(|e| Self::file_error(name, &e))?;
        Ok((format, bytes))
    }

    /// Delete a stored image
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid, the file does not exist or
    /// cannot be removed
    pub async fn delete(&self, name: &str) -> AppResult<()> {
        Self::validate_name(name)?;
        fs::remove_file(self.dir.join(name))
            .await
            .map_err(|e| Self::file_error(name, &e))?;
        info!(image.name = %name, "Image deleted");
        Ok(())
    }

    /// Check that `name` is a bare file name with an accepted extension
    ///
    /// # Errors
    ///
    /// Returns an `InvalidFormat` error for path components or unknown extensions
    pub fn validate_name(name: &str) -> AppResult<ImageFormat> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(AppError::invalid_format(format!(
                "Invalid image name '{name}'"
            )));
        }
        let (stem, extension) = name
            .rsplit_once('.')
            .ok_or_else(|| AppError::invalid_format(format!("Invalid image name '{name}'")))?;
        if stem.is_empty() {
            return Err(AppError::invalid_format(format!(
                "Invalid image name '{name}'"
            )));
        }
        ImageFormat::from_extension(extension).ok_or_else(|| {
            AppError::invalid_format(format!("Unsupported image extension '{extension}'"))
        })
    }

    fn file_error(name: &str, error: &io::Error) -> AppError {
        if error.kind() == io::ErrorKind::NotFound {
            AppError::not_found(format!("Image {name}"))
        } else {
            AppError::storage(format!("Failed to access image {name}: {error}"))
        }
    }
}

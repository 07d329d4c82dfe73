// ABOUTME: Image asset storage behind a trait seam, with a local filesystem implementation
// ABOUTME: Decodes base64 recipe image payloads and persists them under the media directory
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Image Storage
//!
//! Recipe writes carry the image as a base64 payload (bare, or a
//! `data:image/...;base64,` data URL). Decoding happens here; where the
//! bytes end up is behind [`ImageStore`] so the storage backend stays an
//! external concern. [`LocalImageStore`] writes into the configured media
//! directory and returns the relative path stored on the recipe row.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine};
use std::path::PathBuf;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Storage backend for decoded recipe images
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Decode a base64 image payload and persist it
    ///
    /// Returns the stored path recorded on the recipe row.
    async fn store_base64(&self, payload: &str) -> AppResult<String>;
}

/// Filesystem-backed image store writing under a media directory
pub struct LocalImageStore {
    media_dir: PathBuf,
}

impl LocalImageStore {
    /// Create a store rooted at the given media directory
    #[must_use]
    pub fn new(media_dir: impl Into<PathBuf>) -> Self {
        Self {
            media_dir: media_dir.into(),
        }
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store_base64(&self, payload: &str) -> AppResult<String> {
        let (extension, encoded) = split_data_url(payload);

        let bytes = general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| AppError::validation("image", format!("Invalid base64 image: {e}")))?;

        if bytes.is_empty() {
            return Err(AppError::validation("image", "Image payload is empty"));
        }

        tokio::fs::create_dir_all(&self.media_dir)
            .await
            .map_err(|e| AppError::storage(format!("Failed to create media dir: {e}")))?;

        let filename = format!("{}.{extension}", Uuid::new_v4());
        let path = self.media_dir.join(&filename);

        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| AppError::storage(format!("Failed to write image: {e}")))?;

        Ok(format!("media/{filename}"))
    }
}

/// Split an optional `data:image/<ext>;base64,` prefix from the payload
///
/// Returns the file extension (default `png`) and the base64 body.
fn split_data_url(payload: &str) -> (String, &str) {
    if let Some(rest) = payload.strip_prefix("data:image/") {
        if let Some((mime_ext, body)) = rest.split_once(";base64,") {
            let extension = match mime_ext {
                "jpeg" => "jpg",
                "svg+xml" => "svg",
                other => other,
            };
            return (extension.to_owned(), body);
        }
    }
    ("png".to_owned(), payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain_base64_defaults_to_png() {
        let (ext, body) = split_data_url("aGVsbG8=");
        assert_eq!(ext, "png");
        assert_eq!(body, "aGVsbG8=");
    }

    #[test]
    fn test_split_data_url_extracts_extension() {
        let (ext, body) = split_data_url("data:image/jpeg;base64,aGVsbG8=");
        assert_eq!(ext, "jpg");
        assert_eq!(body, "aGVsbG8=");
    }

    #[tokio::test]
    async fn test_store_rejects_invalid_base64() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path());
        let result = store.store_base64("not!!valid??base64").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_store_writes_decoded_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalImageStore::new(dir.path());

        let stored = store
            .store_base64(&general_purpose::STANDARD.encode(b"fake image bytes"))
            .await
            .unwrap();

        assert!(stored.starts_with("media/"));
        let filename = stored.strip_prefix("media/").unwrap();
        let on_disk = tokio::fs::read(dir.path().join(filename)).await.unwrap();
        assert_eq!(on_disk, b"fake image bytes");
    }
}
